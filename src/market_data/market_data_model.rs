//! Domain and database models for bar and level-1 tick series.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::partitions::{ProviderId, Resolution};
use crate::utils::time_utils::{format_utc, parse_utc};

/// Which class of bar data a read should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceDataType {
    Actual,
    Synthetic,
    /// Actual and synthetic merged; on a timestamp collision the actual row
    /// wins.
    Both,
}

/// One OHLCV aggregate over a time window. Timestamps are UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub ticker: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub synthetic: bool,
}

/// One level-1 quote observation. Timestamps are UTC, second granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level1Tick {
    pub ticker: String,
    pub timestamp: DateTime<Utc>,
    pub bid: Decimal,
    pub bid_size: Decimal,
    pub ask: Decimal,
    pub ask_size: Decimal,
    pub last: Decimal,
    pub last_size: Decimal,
}

/// Parallel-array form of a level-1 batch, as delivered by feed handlers.
/// All arrays must have the same length.
#[derive(Debug, Clone, Default)]
pub struct Level1Batch {
    pub datetimes: Vec<DateTime<Utc>>,
    pub bids: Vec<Decimal>,
    pub bid_sizes: Vec<Decimal>,
    pub asks: Vec<Decimal>,
    pub ask_sizes: Vec<Decimal>,
    pub lasts: Vec<Decimal>,
    pub last_sizes: Vec<Decimal>,
}

impl Level1Batch {
    pub fn len(&self) -> usize {
        self.datetimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datetimes.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.datetimes.len();
        let lengths = [
            self.bids.len(),
            self.bid_sizes.len(),
            self.asks.len(),
            self.ask_sizes.len(),
            self.lasts.len(),
            self.last_sizes.len(),
        ];
        if lengths.iter().any(|&l| l != n) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Level-1 batch arrays have mismatched lengths (datetimes = {})",
                n
            ))));
        }
        Ok(())
    }

    /// Tick-by-tick view of the batch for the given instrument.
    pub fn ticks(&self, ticker: &str) -> Vec<Level1Tick> {
        (0..self.len())
            .map(|i| Level1Tick {
                ticker: ticker.to_string(),
                timestamp: self.datetimes[i],
                bid: self.bids[i],
                bid_size: self.bid_sizes[i],
                ask: self.asks[i],
                ask_size: self.ask_sizes[i],
                last: self.lasts[i],
                last_size: self.last_sizes[i],
            })
            .collect()
    }
}

// =============================================================================
// Database models
// =============================================================================

/// Database model for bar rows.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::instrument_bars)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BarDB {
    pub provider: String,
    pub resolution: String,
    pub synthetic: bool,
    pub ticker: String,
    pub timestamp: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl BarDB {
    /// Builds the row for one partition. The partition's synthetic flag is
    /// authoritative, not the one carried on the domain bar.
    pub fn from_domain(
        provider: &ProviderId,
        resolution: Resolution,
        synthetic: bool,
        bar: &Bar,
    ) -> Self {
        Self {
            provider: provider.as_str().to_string(),
            resolution: resolution.as_str().to_string(),
            synthetic,
            ticker: bar.ticker.clone(),
            timestamp: format_utc(bar.timestamp),
            open: bar.open.to_string(),
            high: bar.high.to_string(),
            low: bar.low.to_string(),
            close: bar.close.to_string(),
            volume: bar.volume.to_string(),
        }
    }
}

impl From<BarDB> for Bar {
    fn from(db: BarDB) -> Self {
        Bar {
            ticker: db.ticker,
            timestamp: parse_utc(&db.timestamp).unwrap_or_else(|_| Utc::now()),
            open: Decimal::from_str(&db.open).unwrap_or_default(),
            high: Decimal::from_str(&db.high).unwrap_or_default(),
            low: Decimal::from_str(&db.low).unwrap_or_default(),
            close: Decimal::from_str(&db.close).unwrap_or_default(),
            volume: Decimal::from_str(&db.volume).unwrap_or_default(),
            synthetic: db.synthetic,
        }
    }
}

/// Database model for level-1 tick rows.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::level1_ticks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Level1TickDB {
    pub provider: String,
    pub ticker: String,
    pub timestamp: String,
    pub bid: String,
    pub bid_size: String,
    pub ask: String,
    pub ask_size: String,
    pub last: String,
    pub last_size: String,
}

impl Level1TickDB {
    pub fn from_domain(provider: &ProviderId, tick: &Level1Tick) -> Self {
        Self {
            provider: provider.as_str().to_string(),
            ticker: tick.ticker.clone(),
            timestamp: format_utc(tick.timestamp),
            bid: tick.bid.to_string(),
            bid_size: tick.bid_size.to_string(),
            ask: tick.ask.to_string(),
            ask_size: tick.ask_size.to_string(),
            last: tick.last.to_string(),
            last_size: tick.last_size.to_string(),
        }
    }
}

impl From<Level1TickDB> for Level1Tick {
    fn from(db: Level1TickDB) -> Self {
        Level1Tick {
            ticker: db.ticker,
            timestamp: parse_utc(&db.timestamp).unwrap_or_else(|_| Utc::now()),
            bid: Decimal::from_str(&db.bid).unwrap_or_default(),
            bid_size: Decimal::from_str(&db.bid_size).unwrap_or_default(),
            ask: Decimal::from_str(&db.ask).unwrap_or_default(),
            ask_size: Decimal::from_str(&db.ask_size).unwrap_or_default(),
            last: Decimal::from_str(&db.last).unwrap_or_default(),
            last_size: Decimal::from_str(&db.last_size).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn level1_batch_rejects_mismatched_lengths() {
        let batch = Level1Batch {
            datetimes: vec![Utc.timestamp_opt(1_700_000_000, 0).unwrap()],
            bids: vec![dec!(1.0), dec!(2.0)],
            ..Default::default()
        };
        assert!(batch.validate().is_err());
    }

    #[test]
    fn bar_row_round_trips() {
        let bar = Bar {
            ticker: "MSFT".to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            open: dec!(200),
            high: dec!(400),
            low: dec!(100),
            close: dec!(300),
            volume: dec!(500),
            synthetic: false,
        };
        let db = BarDB::from_domain(&ProviderId::from("Acme"), Resolution::Day, true, &bar);
        assert!(db.synthetic);
        let back = Bar::from(db);
        assert_eq!(back.open, dec!(200));
        assert_eq!(back.timestamp, bar.timestamp);
        assert!(back.synthetic);
    }
}
