//! Fundamentals: reference rows, provider-scoped associations and their
//! value series.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::partitions::ProviderId;
use crate::utils::time_utils::parse_utc;

/// What a fundamental attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundamentalCategory {
    Country,
    Instrument,
}

impl FundamentalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundamentalCategory::Country => "Country",
            FundamentalCategory::Instrument => "Instrument",
        }
    }
}

impl fmt::Display for FundamentalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FundamentalCategory {
    fn from(s: &str) -> Self {
        match s {
            "Instrument" => FundamentalCategory::Instrument,
            _ => FundamentalCategory::Country,
        }
    }
}

/// How often new values for a fundamental are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseInterval {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annually,
}

impl ReleaseInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseInterval::Daily => "Daily",
            ReleaseInterval::Weekly => "Weekly",
            ReleaseInterval::Monthly => "Monthly",
            ReleaseInterval::Quarterly => "Quarterly",
            ReleaseInterval::Annually => "Annually",
        }
    }
}

impl From<&str> for ReleaseInterval {
    fn from(s: &str) -> Self {
        match s {
            "Daily" => ReleaseInterval::Daily,
            "Weekly" => ReleaseInterval::Weekly,
            "Monthly" => ReleaseInterval::Monthly,
            "Annually" => ReleaseInterval::Annually,
            _ => ReleaseInterval::Quarterly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamental {
    pub id: String,
    pub category: FundamentalCategory,
    pub release_interval: ReleaseInterval,
    pub name: String,
    pub description: String,
}

/// A (provider, fundamental, country-or-instrument) link. `target_id` is a
/// country id or an instrument id depending on which table the row came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalAssociation {
    pub id: String,
    pub provider: ProviderId,
    pub fundamental_id: String,
    pub target_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalValue {
    pub association_id: String,
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

// =============================================================================
// Database models
// =============================================================================

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::fundamentals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundamentalDB {
    pub id: String,
    pub category: String,
    pub release_interval: String,
    pub name: String,
    pub description: String,
}

impl From<FundamentalDB> for Fundamental {
    fn from(db: FundamentalDB) -> Self {
        Fundamental {
            id: db.id,
            category: FundamentalCategory::from(db.category.as_str()),
            release_interval: ReleaseInterval::from(db.release_interval.as_str()),
            name: db.name,
            description: db.description,
        }
    }
}

impl From<&Fundamental> for FundamentalDB {
    fn from(domain: &Fundamental) -> Self {
        FundamentalDB {
            id: domain.id.clone(),
            category: domain.category.as_str().to_string(),
            release_interval: domain.release_interval.as_str().to_string(),
            name: domain.name.clone(),
            description: domain.description.clone(),
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::country_fundamental_associations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CountryFundamentalAssociationDB {
    pub id: String,
    pub provider: String,
    pub fundamental_id: String,
    pub country_id: String,
}

impl From<CountryFundamentalAssociationDB> for FundamentalAssociation {
    fn from(db: CountryFundamentalAssociationDB) -> Self {
        FundamentalAssociation {
            id: db.id,
            provider: ProviderId::from(db.provider),
            fundamental_id: db.fundamental_id,
            target_id: db.country_id,
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::instrument_fundamental_associations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentFundamentalAssociationDB {
    pub id: String,
    pub provider: String,
    pub fundamental_id: String,
    pub instrument_id: String,
}

impl From<InstrumentFundamentalAssociationDB> for FundamentalAssociation {
    fn from(db: InstrumentFundamentalAssociationDB) -> Self {
        FundamentalAssociation {
            id: db.id,
            provider: ProviderId::from(db.provider),
            fundamental_id: db.fundamental_id,
            target_id: db.instrument_id,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::country_fundamental_values)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CountryFundamentalValueDB {
    pub association_id: String,
    pub timestamp: String,
    pub value: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::instrument_fundamental_values)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentFundamentalValueDB {
    pub association_id: String,
    pub timestamp: String,
    pub value: String,
}

impl From<CountryFundamentalValueDB> for FundamentalValue {
    fn from(db: CountryFundamentalValueDB) -> Self {
        FundamentalValue {
            association_id: db.association_id,
            timestamp: parse_utc(&db.timestamp).unwrap_or_else(|_| Utc::now()),
            value: Decimal::from_str(&db.value).unwrap_or_default(),
        }
    }
}

impl From<InstrumentFundamentalValueDB> for FundamentalValue {
    fn from(db: InstrumentFundamentalValueDB) -> Self {
        FundamentalValue {
            association_id: db.association_id,
            timestamp: parse_utc(&db.timestamp).unwrap_or_else(|_| Utc::now()),
            value: Decimal::from_str(&db.value).unwrap_or_default(),
        }
    }
}
