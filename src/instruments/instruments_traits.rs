//! Contracts for the instrument and instrument-group store.

use super::instruments_model::{Instrument, InstrumentGroup};
use crate::errors::Result;

pub trait InstrumentStore: Send + Sync {
    /// Inserts an instrument and its association sets. Duplicate id (or
    /// ticker) is a unique-violation error.
    fn create(&self, instrument: &Instrument) -> Result<Instrument>;

    /// Full-attribute replace, association sets reconciled by diff. Missing
    /// id is a NotFound error.
    fn update(&self, instrument: &Instrument) -> Result<Instrument>;

    /// Instrument with association sets populated; `Ok(None)` when absent.
    fn get(&self, id: &str) -> Result<Option<Instrument>>;

    /// Lookup by the ticker natural key.
    fn get_by_ticker(&self, ticker: &str) -> Result<Option<Instrument>>;

    fn list(&self) -> Result<Vec<Instrument>>;

    /// Cascade delete: bar rows at every resolution/synthetic partition for
    /// every provider, level-1 ticks, group memberships, secondary-exchange
    /// links, fundamental associations and values, then the instrument row.
    /// Returns total rows removed; missing id yields 0.
    fn delete(&self, id: &str) -> Result<usize>;

    /// Inserts a group; an empty parent defaults to the root sentinel.
    fn create_group(&self, group: &InstrumentGroup) -> Result<InstrumentGroup>;

    /// Full replace including the member set (diff reconciliation).
    fn update_group(&self, group: &InstrumentGroup) -> Result<InstrumentGroup>;

    fn get_group(&self, id: &str) -> Result<Option<InstrumentGroup>>;

    fn list_groups(&self) -> Result<Vec<InstrumentGroup>>;

    /// Deletes a group and its membership rows; child groups are re-parented
    /// to the root sentinel, not deleted. Returns rows removed.
    fn delete_group(&self, id: &str) -> Result<usize>;
}
