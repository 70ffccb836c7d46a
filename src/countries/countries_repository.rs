//! SQLite repository for countries.

use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use super::countries_model::{Country, CountryDB};
use super::countries_traits::CountryStore;
use crate::db::{get_connection, DbConnection, DbPool, DbTransactionExecutor};
use crate::errors::{DatabaseError, Error, IntoDomain, Result};
use crate::exchanges::exchanges_repository::delete_exchange_tx;
use crate::fundamentals::fundamentals_repository::delete_country_associations_tx;
use crate::schema::countries::dsl as countries_dsl;
use crate::schema::exchanges::dsl as exchanges_dsl;
use crate::schema::holidays::dsl as holidays_dsl;

pub struct CountryRepository {
    pool: Arc<DbPool>,
}

impl CountryRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl CountryStore for CountryRepository {
    fn create(&self, country: Country) -> Result<Country> {
        let mut domain = country;
        if domain.id.is_empty() {
            domain.id = uuid::Uuid::new_v4().to_string();
        }

        self.pool.execute(move |conn| {
            diesel::insert_into(countries_dsl::countries)
                .values(&CountryDB::from(&domain))
                .execute(conn)
                .into_domain()?;
            Ok(domain)
        })
    }

    fn update(&self, country: Country) -> Result<Country> {
        self.pool.execute(move |conn| {
            let row = CountryDB::from(&country);
            let affected = diesel::update(countries_dsl::countries.find(&row.id))
                .set(&row)
                .execute(conn)
                .into_domain()?;
            if affected == 0 {
                return Err(Error::Database(DatabaseError::NotFound(format!(
                    "Country with id {} not found",
                    row.id
                ))));
            }
            Ok(country)
        })
    }

    fn get(&self, id: &str) -> Result<Option<Country>> {
        let mut conn = get_connection(&self.pool)?;
        let row = countries_dsl::countries
            .find(id)
            .first::<CountryDB>(&mut conn)
            .optional()
            .into_domain()?;
        Ok(row.map(Country::from))
    }

    fn get_by_iso_code(&self, iso_code: &str) -> Result<Option<Country>> {
        let mut conn = get_connection(&self.pool)?;
        let row = countries_dsl::countries
            .filter(countries_dsl::iso_code.eq(iso_code))
            .first::<CountryDB>(&mut conn)
            .optional()
            .into_domain()?;
        Ok(row.map(Country::from))
    }

    fn list(&self) -> Result<Vec<Country>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = countries_dsl::countries
            .order(countries_dsl::name.asc())
            .load::<CountryDB>(&mut conn)
            .into_domain()?;
        Ok(rows.into_iter().map(Country::from).collect())
    }

    fn delete(&self, id: &str) -> Result<usize> {
        let id = id.to_string();
        self.pool.execute(move |conn| delete_country_tx(conn, &id))
    }
}

/// Full country cascade on the caller's transaction. Each exchange goes
/// through the exchange cascade, which in turn removes its instruments and
/// their data.
pub(crate) fn delete_country_tx(conn: &mut DbConnection, id: &str) -> Result<usize> {
    let exists = diesel::select(diesel::dsl::exists(
        countries_dsl::countries.filter(countries_dsl::id.eq(id)),
    ))
    .get_result::<bool>(conn)
    .into_domain()?;
    if !exists {
        return Ok(0);
    }

    let mut removed = 0;

    let exchange_ids: Vec<String> = exchanges_dsl::exchanges
        .filter(exchanges_dsl::country_id.eq(id))
        .select(exchanges_dsl::id)
        .load::<String>(conn)
        .into_domain()?;
    for exchange_id in exchange_ids {
        removed += delete_exchange_tx(conn, &exchange_id)?;
    }

    removed += diesel::delete(holidays_dsl::holidays.filter(holidays_dsl::parent_id.eq(id)))
        .execute(conn)
        .into_domain()?;

    removed += delete_country_associations_tx(conn, id)?;

    removed += diesel::delete(countries_dsl::countries.find(id))
        .execute(conn)
        .into_domain()?;

    debug!("Country {} cascade removed {} rows", id, removed);
    Ok(removed)
}
