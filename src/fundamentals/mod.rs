pub mod fundamentals_model;
pub mod fundamentals_repository;
pub mod fundamentals_traits;

pub use fundamentals_model::{
    Fundamental, FundamentalAssociation, FundamentalCategory, FundamentalValue, ReleaseInterval,
};
pub use fundamentals_repository::FundamentalRepository;
pub use fundamentals_traits::FundamentalStore;
