pub mod instruments_model;
pub mod instruments_repository;
pub mod instruments_traits;

pub use instruments_model::{Instrument, InstrumentGroup, InstrumentType};
pub use instruments_repository::InstrumentRepository;
pub use instruments_traits::InstrumentStore;
