//! Contract for the fundamentals store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::fundamentals_model::{Fundamental, FundamentalAssociation, FundamentalValue};
use crate::errors::Result;
use crate::partitions::ProviderId;

pub trait FundamentalStore: Send + Sync {
    /// Inserts a fundamental. A duplicate id is a unique-violation error.
    fn create(&self, fundamental: &Fundamental) -> Result<Fundamental>;

    /// Replaces every attribute of an existing fundamental; missing id is a
    /// NotFound error.
    fn update(&self, fundamental: &Fundamental) -> Result<Fundamental>;

    /// `Ok(None)` when the id does not exist.
    fn get(&self, id: &str) -> Result<Option<Fundamental>>;

    fn list(&self) -> Result<Vec<Fundamental>>;

    /// Cascade delete: associations and their values across every provider,
    /// then the fundamental row. Returns total rows removed; missing id
    /// yields 0.
    fn delete(&self, id: &str) -> Result<usize>;

    /// Links a fundamental to a country under one provider; returns the
    /// generated association id.
    fn associate_country(
        &self,
        provider: &ProviderId,
        fundamental_id: &str,
        country_id: &str,
    ) -> Result<String>;

    /// Links a fundamental to an instrument under one provider.
    fn associate_instrument(
        &self,
        provider: &ProviderId,
        fundamental_id: &str,
        instrument_id: &str,
    ) -> Result<String>;

    fn get_country_association(
        &self,
        provider: &ProviderId,
        fundamental_id: &str,
        country_id: &str,
    ) -> Result<Option<FundamentalAssociation>>;

    fn get_instrument_association(
        &self,
        provider: &ProviderId,
        fundamental_id: &str,
        instrument_id: &str,
    ) -> Result<Option<FundamentalAssociation>>;

    /// Upserts `(timestamp, value)` points on a country association series.
    fn upsert_country_values(
        &self,
        association_id: &str,
        points: &[(DateTime<Utc>, Decimal)],
    ) -> Result<usize>;

    /// Upserts `(timestamp, value)` points on an instrument association
    /// series.
    fn upsert_instrument_values(
        &self,
        association_id: &str,
        points: &[(DateTime<Utc>, Decimal)],
    ) -> Result<usize>;

    fn get_country_values(&self, association_id: &str) -> Result<Vec<FundamentalValue>>;

    fn get_instrument_values(&self, association_id: &str) -> Result<Vec<FundamentalValue>>;

    /// Removes one value point from a country series.
    fn delete_country_value(&self, association_id: &str, timestamp: DateTime<Utc>)
        -> Result<usize>;

    /// Removes one value point from an instrument series.
    fn delete_instrument_value(
        &self,
        association_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<usize>;

    /// Removes every value row a provider holds for one fundamental, keeping
    /// the association rows. Returns rows removed.
    fn delete_values(&self, provider: &ProviderId, fundamental_id: &str) -> Result<usize>;
}
