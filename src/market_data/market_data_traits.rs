//! Time-series store contract.
//!
//! The feed consumes this trait rather than the concrete repository so that
//! tests can inject an in-memory series.

use chrono::{DateTime, Utc};

use super::market_data_model::{Bar, Level1Batch, Level1Tick, PriceDataType};
use crate::errors::Result;
use crate::partitions::{Partition, ProviderId, Resolution};

pub trait BarStore: Send + Sync {
    /// Upserts a batch of bars into the `(provider, resolution, synthetic)`
    /// partition. A row with the same `(ticker, timestamp)` key is replaced
    /// in full; batches are order-independent and idempotent.
    ///
    /// Returns the number of rows written.
    fn upsert_bars(
        &self,
        provider: &ProviderId,
        resolution: Resolution,
        bars: &[Bar],
        synthetic: bool,
    ) -> Result<usize>;

    /// Returns bars with `timestamp` in `[from, to]`, ascending by timestamp.
    ///
    /// `PriceDataType::Both` merges the actual and synthetic partitions; a
    /// timestamp present in both yields the actual row only.
    fn get_bars(
        &self,
        provider: &ProviderId,
        ticker: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        resolution: Resolution,
        price_data_type: PriceDataType,
    ) -> Result<Vec<Bar>>;

    /// Upserts a level-1 batch tick-by-tick. Fails validation when the
    /// parallel arrays have mismatched lengths. Returns rows written.
    fn upsert_level1(&self, provider: &ProviderId, ticker: &str, batch: &Level1Batch)
        -> Result<usize>;

    /// Returns level-1 ticks with `timestamp` in `[from, to]`, ascending.
    fn get_level1(
        &self,
        provider: &ProviderId,
        ticker: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Level1Tick>>;

    /// Verification primitive: number of rows currently held by a partition.
    fn partition_row_count(&self, partition: &Partition) -> Result<usize>;
}
