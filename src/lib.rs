pub mod db;

pub mod countries;
pub mod exchanges;
pub mod fundamentals;
pub mod instruments;
pub mod market_data;

pub mod constants;
pub mod errors;
pub mod feed;
pub mod partitions;
pub mod schema;
pub mod settings;
pub mod utils;

pub use errors::{Error, Result};
pub use feed::*;
pub use partitions::{Partition, PartitionKind, ProviderId, Resolution};
