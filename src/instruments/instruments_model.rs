//! Instruments and instrument groups.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::INSTRUMENT_GROUP_ROOT_ID;
use crate::utils::time_utils::{format_utc, parse_utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentType {
    Stock,
    Forex,
    Future,
    Index,
}

impl InstrumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentType::Stock => "Stock",
            InstrumentType::Forex => "Forex",
            InstrumentType::Future => "Future",
            InstrumentType::Index => "Index",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for InstrumentType {
    fn from(s: &str) -> Self {
        match s {
            "Forex" => InstrumentType::Forex,
            "Future" => InstrumentType::Future,
            "Index" => InstrumentType::Index,
            _ => InstrumentType::Stock,
        }
    }
}

/// A tradeable instrument. `ticker` is the secondary natural key used for
/// time-series partitioning; `inception_date` is always UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: String,
    pub instrument_type: InstrumentType,
    pub ticker: String,
    pub name: String,
    pub description: String,
    pub primary_exchange_id: String,
    pub inception_date: DateTime<Utc>,
    pub secondary_exchange_ids: Vec<String>,
    pub instrument_group_ids: Vec<String>,
}

/// A node in the self-referential group tree. Top-level groups parent to the
/// root sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentGroup {
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub description: String,
    pub instrument_ids: Vec<String>,
}

impl InstrumentGroup {
    /// Normalizes an absent parent to the root sentinel.
    pub fn effective_parent_id(&self) -> &str {
        if self.parent_id.is_empty() {
            INSTRUMENT_GROUP_ROOT_ID
        } else {
            &self.parent_id
        }
    }
}

// =============================================================================
// Database models
// =============================================================================

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentDB {
    pub id: String,
    pub instrument_type: String,
    pub ticker: String,
    pub name: String,
    pub description: String,
    pub primary_exchange_id: String,
    pub inception_date: String,
}

impl From<&Instrument> for InstrumentDB {
    fn from(domain: &Instrument) -> Self {
        InstrumentDB {
            id: domain.id.clone(),
            instrument_type: domain.instrument_type.as_str().to_string(),
            ticker: domain.ticker.clone(),
            name: domain.name.clone(),
            description: domain.description.clone(),
            primary_exchange_id: domain.primary_exchange_id.clone(),
            inception_date: format_utc(domain.inception_date),
        }
    }
}

impl From<InstrumentDB> for Instrument {
    /// Association sets start empty; the repository populates them.
    fn from(db: InstrumentDB) -> Self {
        Instrument {
            id: db.id,
            instrument_type: InstrumentType::from(db.instrument_type.as_str()),
            ticker: db.ticker,
            name: db.name,
            description: db.description,
            primary_exchange_id: db.primary_exchange_id,
            inception_date: parse_utc(&db.inception_date).unwrap_or_else(|_| Utc::now()),
            secondary_exchange_ids: Vec::new(),
            instrument_group_ids: Vec::new(),
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::instrument_groups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentGroupDB {
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub description: String,
}

impl From<&InstrumentGroup> for InstrumentGroupDB {
    fn from(domain: &InstrumentGroup) -> Self {
        InstrumentGroupDB {
            id: domain.id.clone(),
            parent_id: domain.effective_parent_id().to_string(),
            name: domain.name.clone(),
            description: domain.description.clone(),
        }
    }
}

impl From<InstrumentGroupDB> for InstrumentGroup {
    fn from(db: InstrumentGroupDB) -> Self {
        InstrumentGroup {
            id: db.id,
            parent_id: db.parent_id,
            name: db.name,
            description: db.description,
            instrument_ids: Vec::new(),
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::instrument_group_members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentGroupMemberDB {
    pub instrument_group_id: String,
    pub instrument_id: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::instrument_secondary_exchanges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentSecondaryExchangeDB {
    pub instrument_id: String,
    pub exchange_id: String,
}
