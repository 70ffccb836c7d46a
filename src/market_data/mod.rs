pub mod market_data_model;
pub mod market_data_repository;
pub mod market_data_traits;

pub use market_data_model::{Bar, Level1Batch, Level1Tick, PriceDataType};
pub use market_data_repository::MarketDataRepository;
pub use market_data_traits::BarStore;
