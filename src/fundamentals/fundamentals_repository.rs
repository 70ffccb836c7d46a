//! SQLite repository for fundamentals, associations and value series.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::fundamentals_model::{
    CountryFundamentalAssociationDB, CountryFundamentalValueDB, Fundamental,
    FundamentalAssociation, FundamentalDB, FundamentalValue, InstrumentFundamentalAssociationDB,
    InstrumentFundamentalValueDB,
};
use super::fundamentals_traits::FundamentalStore;
use crate::db::{get_connection, DbConnection, DbPool, DbTransactionExecutor};
use crate::errors::{DatabaseError, Error, IntoDomain, Result};
use crate::partitions::ProviderId;
use crate::schema::country_fundamental_associations::dsl as cfa_dsl;
use crate::schema::country_fundamental_values::dsl as cfv_dsl;
use crate::schema::fundamentals::dsl as fundamentals_dsl;
use crate::schema::instrument_fundamental_associations::dsl as ifa_dsl;
use crate::schema::instrument_fundamental_values::dsl as ifv_dsl;
use crate::utils::time_utils::format_utc;

pub struct FundamentalRepository {
    pool: Arc<DbPool>,
}

impl FundamentalRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl FundamentalStore for FundamentalRepository {
    fn create(&self, fundamental: &Fundamental) -> Result<Fundamental> {
        let mut row = FundamentalDB::from(fundamental);
        if row.id.is_empty() {
            row.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(fundamentals_dsl::fundamentals)
            .values(&row)
            .execute(&mut conn)
            .into_domain()?;

        Ok(Fundamental::from(row))
    }

    fn update(&self, fundamental: &Fundamental) -> Result<Fundamental> {
        let row = FundamentalDB::from(fundamental);
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::update(fundamentals_dsl::fundamentals.find(&row.id))
            .set(&row)
            .execute(&mut conn)
            .into_domain()?;

        if affected == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Fundamental with id {} not found",
                row.id
            ))));
        }

        Ok(Fundamental::from(row))
    }

    fn get(&self, id: &str) -> Result<Option<Fundamental>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fundamentals_dsl::fundamentals
            .find(id)
            .first::<FundamentalDB>(&mut conn)
            .optional()
            .into_domain()?;
        Ok(row.map(Fundamental::from))
    }

    fn list(&self) -> Result<Vec<Fundamental>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = fundamentals_dsl::fundamentals
            .order(fundamentals_dsl::name.asc())
            .load::<FundamentalDB>(&mut conn)
            .into_domain()?;
        Ok(rows.into_iter().map(Fundamental::from).collect())
    }

    fn delete(&self, id: &str) -> Result<usize> {
        let id = id.to_string();
        self.pool.execute(move |conn| delete_fundamental_tx(conn, &id))
    }

    fn associate_country(
        &self,
        provider: &ProviderId,
        fundamental_id: &str,
        country_id: &str,
    ) -> Result<String> {
        let row = CountryFundamentalAssociationDB {
            id: uuid::Uuid::new_v4().to_string(),
            provider: provider.as_str().to_string(),
            fundamental_id: fundamental_id.to_string(),
            country_id: country_id.to_string(),
        };

        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(cfa_dsl::country_fundamental_associations)
            .values(&row)
            .execute(&mut conn)
            .into_domain()?;

        Ok(row.id)
    }

    fn associate_instrument(
        &self,
        provider: &ProviderId,
        fundamental_id: &str,
        instrument_id: &str,
    ) -> Result<String> {
        let row = InstrumentFundamentalAssociationDB {
            id: uuid::Uuid::new_v4().to_string(),
            provider: provider.as_str().to_string(),
            fundamental_id: fundamental_id.to_string(),
            instrument_id: instrument_id.to_string(),
        };

        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(ifa_dsl::instrument_fundamental_associations)
            .values(&row)
            .execute(&mut conn)
            .into_domain()?;

        Ok(row.id)
    }

    fn get_country_association(
        &self,
        provider: &ProviderId,
        fundamental_id: &str,
        country_id: &str,
    ) -> Result<Option<FundamentalAssociation>> {
        let mut conn = get_connection(&self.pool)?;
        let row = cfa_dsl::country_fundamental_associations
            .filter(cfa_dsl::provider.eq(provider.as_str()))
            .filter(cfa_dsl::fundamental_id.eq(fundamental_id))
            .filter(cfa_dsl::country_id.eq(country_id))
            .first::<CountryFundamentalAssociationDB>(&mut conn)
            .optional()
            .into_domain()?;
        Ok(row.map(FundamentalAssociation::from))
    }

    fn get_instrument_association(
        &self,
        provider: &ProviderId,
        fundamental_id: &str,
        instrument_id: &str,
    ) -> Result<Option<FundamentalAssociation>> {
        let mut conn = get_connection(&self.pool)?;
        let row = ifa_dsl::instrument_fundamental_associations
            .filter(ifa_dsl::provider.eq(provider.as_str()))
            .filter(ifa_dsl::fundamental_id.eq(fundamental_id))
            .filter(ifa_dsl::instrument_id.eq(instrument_id))
            .first::<InstrumentFundamentalAssociationDB>(&mut conn)
            .optional()
            .into_domain()?;
        Ok(row.map(FundamentalAssociation::from))
    }

    fn upsert_country_values(
        &self,
        association_id: &str,
        points: &[(DateTime<Utc>, Decimal)],
    ) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }
        let rows: Vec<CountryFundamentalValueDB> = points
            .iter()
            .map(|(ts, v)| CountryFundamentalValueDB {
                association_id: association_id.to_string(),
                timestamp: format_utc(*ts),
                value: v.to_string(),
            })
            .collect();

        let mut conn = get_connection(&self.pool)?;
        diesel::replace_into(cfv_dsl::country_fundamental_values)
            .values(&rows)
            .execute(&mut conn)
            .into_domain()
    }

    fn upsert_instrument_values(
        &self,
        association_id: &str,
        points: &[(DateTime<Utc>, Decimal)],
    ) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }
        let rows: Vec<InstrumentFundamentalValueDB> = points
            .iter()
            .map(|(ts, v)| InstrumentFundamentalValueDB {
                association_id: association_id.to_string(),
                timestamp: format_utc(*ts),
                value: v.to_string(),
            })
            .collect();

        let mut conn = get_connection(&self.pool)?;
        diesel::replace_into(ifv_dsl::instrument_fundamental_values)
            .values(&rows)
            .execute(&mut conn)
            .into_domain()
    }

    fn get_country_values(&self, association_id: &str) -> Result<Vec<FundamentalValue>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = cfv_dsl::country_fundamental_values
            .filter(cfv_dsl::association_id.eq(association_id))
            .order(cfv_dsl::timestamp.asc())
            .load::<CountryFundamentalValueDB>(&mut conn)
            .into_domain()?;
        Ok(rows.into_iter().map(FundamentalValue::from).collect())
    }

    fn get_instrument_values(&self, association_id: &str) -> Result<Vec<FundamentalValue>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = ifv_dsl::instrument_fundamental_values
            .filter(ifv_dsl::association_id.eq(association_id))
            .order(ifv_dsl::timestamp.asc())
            .load::<InstrumentFundamentalValueDB>(&mut conn)
            .into_domain()?;
        Ok(rows.into_iter().map(FundamentalValue::from).collect())
    }

    fn delete_country_value(
        &self,
        association_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(
            cfv_dsl::country_fundamental_values
                .filter(cfv_dsl::association_id.eq(association_id))
                .filter(cfv_dsl::timestamp.eq(format_utc(timestamp))),
        )
        .execute(&mut conn)
        .into_domain()
    }

    fn delete_instrument_value(
        &self,
        association_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(
            ifv_dsl::instrument_fundamental_values
                .filter(ifv_dsl::association_id.eq(association_id))
                .filter(ifv_dsl::timestamp.eq(format_utc(timestamp))),
        )
        .execute(&mut conn)
        .into_domain()
    }

    fn delete_values(&self, provider: &ProviderId, fundamental_id: &str) -> Result<usize> {
        let provider = provider.clone();
        let fundamental_id = fundamental_id.to_string();

        self.pool.execute(move |conn| {
            let country_values = diesel::delete(
                cfv_dsl::country_fundamental_values.filter(
                    cfv_dsl::association_id.eq_any(
                        cfa_dsl::country_fundamental_associations
                            .filter(cfa_dsl::provider.eq(provider.as_str()))
                            .filter(cfa_dsl::fundamental_id.eq(&fundamental_id))
                            .select(cfa_dsl::id),
                    ),
                ),
            )
            .execute(conn)
            .into_domain()?;

            let instrument_values = diesel::delete(
                ifv_dsl::instrument_fundamental_values.filter(
                    ifv_dsl::association_id.eq_any(
                        ifa_dsl::instrument_fundamental_associations
                            .filter(ifa_dsl::provider.eq(provider.as_str()))
                            .filter(ifa_dsl::fundamental_id.eq(&fundamental_id))
                            .select(ifa_dsl::id),
                    ),
                ),
            )
            .execute(conn)
            .into_domain()?;

            Ok(country_values + instrument_values)
        })
    }
}

// =============================================================================
// Transaction-scoped cascade helpers
// =============================================================================

/// Deletes a fundamental with its associations and values across every
/// provider. Children first, then the fundamental row. Missing ids count 0.
pub(crate) fn delete_fundamental_tx(conn: &mut DbConnection, id: &str) -> Result<usize> {
    let mut removed = 0;

    removed += diesel::delete(
        cfv_dsl::country_fundamental_values.filter(
            cfv_dsl::association_id.eq_any(
                cfa_dsl::country_fundamental_associations
                    .filter(cfa_dsl::fundamental_id.eq(id))
                    .select(cfa_dsl::id),
            ),
        ),
    )
    .execute(conn)
    .into_domain()?;

    removed += diesel::delete(
        cfa_dsl::country_fundamental_associations.filter(cfa_dsl::fundamental_id.eq(id)),
    )
    .execute(conn)
    .into_domain()?;

    removed += diesel::delete(
        ifv_dsl::instrument_fundamental_values.filter(
            ifv_dsl::association_id.eq_any(
                ifa_dsl::instrument_fundamental_associations
                    .filter(ifa_dsl::fundamental_id.eq(id))
                    .select(ifa_dsl::id),
            ),
        ),
    )
    .execute(conn)
    .into_domain()?;

    removed += diesel::delete(
        ifa_dsl::instrument_fundamental_associations.filter(ifa_dsl::fundamental_id.eq(id)),
    )
    .execute(conn)
    .into_domain()?;

    removed += diesel::delete(fundamentals_dsl::fundamentals.find(id))
        .execute(conn)
        .into_domain()?;

    debug!("Fundamental {} cascade removed {} rows", id, removed);
    Ok(removed)
}

/// Deletes every country-fundamental association (and its values) pointing at
/// one country, across all providers.
pub(crate) fn delete_country_associations_tx(
    conn: &mut DbConnection,
    country_id: &str,
) -> Result<usize> {
    let mut removed = 0;

    removed += diesel::delete(
        cfv_dsl::country_fundamental_values.filter(
            cfv_dsl::association_id.eq_any(
                cfa_dsl::country_fundamental_associations
                    .filter(cfa_dsl::country_id.eq(country_id))
                    .select(cfa_dsl::id),
            ),
        ),
    )
    .execute(conn)
    .into_domain()?;

    removed += diesel::delete(
        cfa_dsl::country_fundamental_associations.filter(cfa_dsl::country_id.eq(country_id)),
    )
    .execute(conn)
    .into_domain()?;

    Ok(removed)
}

/// Deletes every instrument-fundamental association (and its values) pointing
/// at one instrument, across all providers.
pub(crate) fn delete_instrument_associations_tx(
    conn: &mut DbConnection,
    instrument_id: &str,
) -> Result<usize> {
    let mut removed = 0;

    removed += diesel::delete(
        ifv_dsl::instrument_fundamental_values.filter(
            ifv_dsl::association_id.eq_any(
                ifa_dsl::instrument_fundamental_associations
                    .filter(ifa_dsl::instrument_id.eq(instrument_id))
                    .select(ifa_dsl::id),
            ),
        ),
    )
    .execute(conn)
    .into_domain()?;

    removed += diesel::delete(
        ifa_dsl::instrument_fundamental_associations
            .filter(ifa_dsl::instrument_id.eq(instrument_id)),
    )
    .execute(conn)
    .into_domain()?;

    Ok(removed)
}
