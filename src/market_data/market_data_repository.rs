//! SQLite-backed time-series store for bars and level-1 ticks.

use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use super::market_data_model::{Bar, BarDB, Level1Batch, Level1Tick, Level1TickDB, PriceDataType};
use super::market_data_traits::BarStore;
use crate::db::{get_connection, DbConnection, DbPool};
use crate::errors::{IntoDomain, Result};
use crate::partitions::{Partition, PartitionKind, ProviderId, Resolution};
use crate::schema::country_fundamental_associations::dsl as cfa_dsl;
use crate::schema::country_fundamental_values::dsl as cfv_dsl;
use crate::schema::instrument_bars::dsl as bars_dsl;
use crate::schema::instrument_fundamental_associations::dsl as ifa_dsl;
use crate::schema::instrument_fundamental_values::dsl as ifv_dsl;
use crate::schema::level1_ticks::dsl as ticks_dsl;
use crate::utils::time_utils::format_utc;

/// Rows per `replace_into` batch, kept under SQLite's parameter limit.
const UPSERT_CHUNK: usize = 500;

pub struct MarketDataRepository {
    pool: Arc<DbPool>,
}

impl MarketDataRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Removes every bar row a provider holds for one ticker, across all
    /// resolutions and both the actual and synthetic partitions.
    pub fn delete_bars(&self, provider: &ProviderId, ticker: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(
            bars_dsl::instrument_bars
                .filter(bars_dsl::provider.eq(provider.as_str()))
                .filter(bars_dsl::ticker.eq(ticker)),
        )
        .execute(&mut conn)
        .into_domain()
    }

    /// Removes a provider's level-1 series for one ticker.
    pub fn delete_level1(&self, provider: &ProviderId, ticker: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(
            ticks_dsl::level1_ticks
                .filter(ticks_dsl::provider.eq(provider.as_str()))
                .filter(ticks_dsl::ticker.eq(ticker)),
        )
        .execute(&mut conn)
        .into_domain()
    }

    /// Predicate-filtered row count over one bar partition. Loads the
    /// partition and applies the closure; a verification primitive, not a
    /// query path.
    pub fn bar_row_count_where<F>(&self, partition: &Partition, predicate: F) -> Result<usize>
    where
        F: Fn(&Bar) -> bool,
    {
        let resolution = match partition.resolution {
            Some(r) => r,
            None => return Ok(0),
        };
        let mut conn = get_connection(&self.pool)?;
        let rows = bars_dsl::instrument_bars
            .filter(bars_dsl::provider.eq(partition.provider.as_str()))
            .filter(bars_dsl::resolution.eq(resolution.as_str()))
            .filter(bars_dsl::synthetic.eq(partition.synthetic))
            .select(BarDB::as_select())
            .load::<BarDB>(&mut conn)
            .into_domain()?;
        Ok(rows
            .into_iter()
            .map(Bar::from)
            .filter(|b| predicate(b))
            .count())
    }
}

impl BarStore for MarketDataRepository {
    fn upsert_bars(
        &self,
        provider: &ProviderId,
        resolution: Resolution,
        bars: &[Bar],
        synthetic: bool,
    ) -> Result<usize> {
        reject_level1(resolution)?;
        if bars.is_empty() {
            return Ok(0);
        }
        let rows: Vec<BarDB> = bars
            .iter()
            .map(|b| BarDB::from_domain(provider, resolution, synthetic, b))
            .collect();

        debug!(
            "Upserting {} bars into {}",
            rows.len(),
            Partition::bars(provider.clone(), resolution, synthetic)
        );

        let mut conn = get_connection(&self.pool)?;
        let mut written = 0;
        for chunk in rows.chunks(UPSERT_CHUNK) {
            written += diesel::replace_into(bars_dsl::instrument_bars)
                .values(chunk)
                .execute(&mut conn)
                .into_domain()?;
        }
        Ok(written)
    }

    fn get_bars(
        &self,
        provider: &ProviderId,
        ticker: &str,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
        resolution: Resolution,
        price_data_type: PriceDataType,
    ) -> Result<Vec<Bar>> {
        reject_level1(resolution)?;
        let mut conn = get_connection(&self.pool)?;

        let from_str = format_utc(from);
        let to_str = format_utc(to);

        let mut query = bars_dsl::instrument_bars
            .filter(bars_dsl::provider.eq(provider.as_str()))
            .filter(bars_dsl::resolution.eq(resolution.as_str()))
            .filter(bars_dsl::ticker.eq(ticker))
            .filter(bars_dsl::timestamp.ge(&from_str))
            .filter(bars_dsl::timestamp.le(&to_str))
            .into_boxed();

        query = match price_data_type {
            PriceDataType::Actual => query.filter(bars_dsl::synthetic.eq(false)),
            PriceDataType::Synthetic => query.filter(bars_dsl::synthetic.eq(true)),
            PriceDataType::Both => query,
        };

        // Actual rows sort before synthetic at equal timestamps, so the
        // dedup below keeps the actual row on a collision.
        let rows = query
            .order((bars_dsl::timestamp.asc(), bars_dsl::synthetic.asc()))
            .load::<BarDB>(&mut conn)
            .into_domain()?;

        let mut bars: Vec<Bar> = rows.into_iter().map(Bar::from).collect();
        if price_data_type == PriceDataType::Both {
            bars.dedup_by(|a, b| a.timestamp == b.timestamp);
        }
        Ok(bars)
    }

    fn upsert_level1(
        &self,
        provider: &ProviderId,
        ticker: &str,
        batch: &Level1Batch,
    ) -> Result<usize> {
        batch.validate()?;
        if batch.is_empty() {
            return Ok(0);
        }

        let rows: Vec<Level1TickDB> = batch
            .ticks(ticker)
            .iter()
            .map(|t| Level1TickDB::from_domain(provider, t))
            .collect();

        let mut conn = get_connection(&self.pool)?;
        let mut written = 0;
        for chunk in rows.chunks(UPSERT_CHUNK) {
            written += diesel::replace_into(ticks_dsl::level1_ticks)
                .values(chunk)
                .execute(&mut conn)
                .into_domain()?;
        }
        Ok(written)
    }

    fn get_level1(
        &self,
        provider: &ProviderId,
        ticker: &str,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Level1Tick>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = ticks_dsl::level1_ticks
            .filter(ticks_dsl::provider.eq(provider.as_str()))
            .filter(ticks_dsl::ticker.eq(ticker))
            .filter(ticks_dsl::timestamp.ge(format_utc(from)))
            .filter(ticks_dsl::timestamp.le(format_utc(to)))
            .order(ticks_dsl::timestamp.asc())
            .select(Level1TickDB::as_select())
            .load::<Level1TickDB>(&mut conn)
            .into_domain()?;

        Ok(rows.into_iter().map(Level1Tick::from).collect())
    }

    fn partition_row_count(&self, partition: &Partition) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let provider = partition.provider.as_str();

        let count: i64 = match partition.kind {
            PartitionKind::InstrumentData => {
                let resolution = match partition.resolution {
                    Some(r) => r,
                    None => return Ok(0),
                };
                bars_dsl::instrument_bars
                    .filter(bars_dsl::provider.eq(provider))
                    .filter(bars_dsl::resolution.eq(resolution.as_str()))
                    .filter(bars_dsl::synthetic.eq(partition.synthetic))
                    .count()
                    .get_result(&mut conn)
                    .into_domain()?
            }
            PartitionKind::Level1Data => ticks_dsl::level1_ticks
                .filter(ticks_dsl::provider.eq(provider))
                .count()
                .get_result(&mut conn)
                .into_domain()?,
            PartitionKind::CountryFundamentalAssociations => {
                cfa_dsl::country_fundamental_associations
                    .filter(cfa_dsl::provider.eq(provider))
                    .count()
                    .get_result(&mut conn)
                    .into_domain()?
            }
            PartitionKind::CountryFundamentalValues => cfv_dsl::country_fundamental_values
                .filter(
                    cfv_dsl::association_id.eq_any(
                        cfa_dsl::country_fundamental_associations
                            .filter(cfa_dsl::provider.eq(provider))
                            .select(cfa_dsl::id),
                    ),
                )
                .count()
                .get_result(&mut conn)
                .into_domain()?,
            PartitionKind::InstrumentFundamentalAssociations => {
                ifa_dsl::instrument_fundamental_associations
                    .filter(ifa_dsl::provider.eq(provider))
                    .count()
                    .get_result(&mut conn)
                    .into_domain()?
            }
            PartitionKind::InstrumentFundamentalValues => ifv_dsl::instrument_fundamental_values
                .filter(
                    ifv_dsl::association_id.eq_any(
                        ifa_dsl::instrument_fundamental_associations
                            .filter(ifa_dsl::provider.eq(provider))
                            .select(ifa_dsl::id),
                    ),
                )
                .count()
                .get_result(&mut conn)
                .into_domain()?,
        };

        Ok(count as usize)
    }
}

/// Level-1 data lives in its own table and never flows through the bar path.
fn reject_level1(resolution: Resolution) -> Result<()> {
    if resolution == Resolution::Level1 {
        return Err(crate::errors::Error::Unsupported(
            "Level1 is not a bar resolution; use the level-1 tick operations".to_string(),
        ));
    }
    Ok(())
}

// =============================================================================
// Transaction-scoped helpers for cascade deletes
// =============================================================================

/// Deletes every bar row for a ticker, across all providers, resolutions and
/// both partitions. Runs on the caller's (transaction) connection.
pub(crate) fn delete_bars_for_ticker_tx(conn: &mut DbConnection, ticker: &str) -> Result<usize> {
    diesel::delete(bars_dsl::instrument_bars.filter(bars_dsl::ticker.eq(ticker)))
        .execute(conn)
        .into_domain()
}

/// Deletes every level-1 tick for a ticker across all providers.
pub(crate) fn delete_ticks_for_ticker_tx(conn: &mut DbConnection, ticker: &str) -> Result<usize> {
    diesel::delete(ticks_dsl::level1_ticks.filter(ticks_dsl::ticker.eq(ticker)))
        .execute(conn)
        .into_domain()
}
