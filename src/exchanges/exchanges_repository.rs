//! SQLite repository for exchanges, sessions and holidays.

use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use super::exchanges_model::{Exchange, ExchangeDB, Holiday, HolidayDB, HolidayParent, Session, SessionDB};
use super::exchanges_traits::{ExchangeStore, ExchangeTimeZoneSource};
use crate::db::{get_connection, DbConnection, DbPool, DbTransactionExecutor};
use crate::errors::{DatabaseError, Error, IntoDomain, Result};
use crate::instruments::instruments_repository::{
    delete_instrument_tx, delete_secondary_links_for_exchange_tx,
    instrument_ids_for_primary_exchange_tx,
};
use crate::schema::countries::dsl as countries_dsl;
use crate::schema::exchanges::dsl as exchanges_dsl;
use crate::schema::holidays::dsl as holidays_dsl;
use crate::schema::sessions::dsl as sessions_dsl;

pub struct ExchangeRepository {
    pool: Arc<DbPool>,
}

impl ExchangeRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

/// The holiday table stores a bare parent id; the owning entity decides the
/// domain tag. Anything that is a known country id is a country holiday,
/// everything else is treated as an exchange holiday.
fn resolve_holiday_parent(conn: &mut DbConnection, parent_id: &str) -> Result<HolidayParent> {
    let is_country = diesel::select(diesel::dsl::exists(
        countries_dsl::countries.filter(countries_dsl::id.eq(parent_id)),
    ))
    .get_result::<bool>(conn)
    .into_domain()?;

    if is_country {
        Ok(HolidayParent::Country(parent_id.to_string()))
    } else {
        Ok(HolidayParent::Exchange(parent_id.to_string()))
    }
}

impl ExchangeStore for ExchangeRepository {
    fn create_exchange(&self, exchange: Exchange) -> Result<Exchange> {
        let mut domain = exchange;
        if domain.id.is_empty() {
            domain.id = uuid::Uuid::new_v4().to_string();
        }

        self.pool.execute(move |conn| {
            diesel::insert_into(exchanges_dsl::exchanges)
                .values(&ExchangeDB::from(&domain))
                .execute(conn)
                .into_domain()?;
            Ok(domain)
        })
    }

    fn update_exchange(&self, exchange: Exchange) -> Result<Exchange> {
        self.pool.execute(move |conn| {
            let row = ExchangeDB::from(&exchange);
            let affected = diesel::update(exchanges_dsl::exchanges.find(&row.id))
                .set(&row)
                .execute(conn)
                .into_domain()?;
            if affected == 0 {
                return Err(Error::Database(DatabaseError::NotFound(format!(
                    "Exchange with id {} not found",
                    row.id
                ))));
            }
            Ok(exchange)
        })
    }

    fn get_exchange(&self, id: &str) -> Result<Option<Exchange>> {
        let mut conn = get_connection(&self.pool)?;
        let row = exchanges_dsl::exchanges
            .find(id)
            .first::<ExchangeDB>(&mut conn)
            .optional()
            .into_domain()?;
        Ok(row.map(Exchange::from))
    }

    fn list_exchanges(&self) -> Result<Vec<Exchange>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = exchanges_dsl::exchanges
            .order(exchanges_dsl::name.asc())
            .load::<ExchangeDB>(&mut conn)
            .into_domain()?;
        Ok(rows.into_iter().map(Exchange::from).collect())
    }

    fn delete_exchange(&self, id: &str) -> Result<usize> {
        let id = id.to_string();
        self.pool.execute(move |conn| delete_exchange_tx(conn, &id))
    }

    fn create_session(&self, session: Session) -> Result<Session> {
        let mut domain = session;
        if domain.id.is_empty() {
            domain.id = uuid::Uuid::new_v4().to_string();
        }

        self.pool.execute(move |conn| {
            diesel::insert_into(sessions_dsl::sessions)
                .values(&SessionDB::from(&domain))
                .execute(conn)
                .into_domain()?;
            Ok(domain)
        })
    }

    fn update_session(&self, session: Session) -> Result<Session> {
        self.pool.execute(move |conn| {
            let row = SessionDB::from(&session);
            let affected = diesel::update(sessions_dsl::sessions.find(&row.id))
                .set(&row)
                .execute(conn)
                .into_domain()?;
            if affected == 0 {
                return Err(Error::Database(DatabaseError::NotFound(format!(
                    "Session with id {} not found",
                    row.id
                ))));
            }
            Ok(session)
        })
    }

    fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let mut conn = get_connection(&self.pool)?;
        let row = sessions_dsl::sessions
            .find(id)
            .first::<SessionDB>(&mut conn)
            .optional()
            .into_domain()?;
        Ok(row.map(Session::from))
    }

    fn list_sessions(&self, exchange_id: &str) -> Result<Vec<Session>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = sessions_dsl::sessions
            .filter(sessions_dsl::exchange_id.eq(exchange_id))
            .order((sessions_dsl::day_of_week.asc(), sessions_dsl::start_time.asc()))
            .load::<SessionDB>(&mut conn)
            .into_domain()?;
        Ok(rows.into_iter().map(Session::from).collect())
    }

    fn delete_session(&self, id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(sessions_dsl::sessions.find(id))
            .execute(&mut conn)
            .into_domain()
    }

    fn create_holiday(&self, holiday: Holiday) -> Result<Holiday> {
        let mut domain = holiday;
        if domain.id.is_empty() {
            domain.id = uuid::Uuid::new_v4().to_string();
        }

        self.pool.execute(move |conn| {
            diesel::insert_into(holidays_dsl::holidays)
                .values(&HolidayDB::from(&domain))
                .execute(conn)
                .into_domain()?;
            Ok(domain)
        })
    }

    fn update_holiday(&self, holiday: Holiday) -> Result<Holiday> {
        self.pool.execute(move |conn| {
            let row = HolidayDB::from(&holiday);
            let affected = diesel::update(holidays_dsl::holidays.find(&row.id))
                .set(&row)
                .execute(conn)
                .into_domain()?;
            if affected == 0 {
                return Err(Error::Database(DatabaseError::NotFound(format!(
                    "Holiday with id {} not found",
                    row.id
                ))));
            }
            Ok(holiday)
        })
    }

    fn get_holiday(&self, id: &str) -> Result<Option<Holiday>> {
        let mut conn = get_connection(&self.pool)?;
        let row = holidays_dsl::holidays
            .find(id)
            .first::<HolidayDB>(&mut conn)
            .optional()
            .into_domain()?;

        match row {
            Some(db) => {
                let parent = resolve_holiday_parent(&mut conn, &db.parent_id)?;
                Ok(Some(db.into_domain(parent)))
            }
            None => Ok(None),
        }
    }

    fn list_holidays(&self, parent_id: &str) -> Result<Vec<Holiday>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = holidays_dsl::holidays
            .filter(holidays_dsl::parent_id.eq(parent_id))
            .order(holidays_dsl::name.asc())
            .load::<HolidayDB>(&mut conn)
            .into_domain()?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let parent = resolve_holiday_parent(&mut conn, parent_id)?;
        Ok(rows
            .into_iter()
            .map(|db| db.into_domain(parent.clone()))
            .collect())
    }

    fn delete_holiday(&self, id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(holidays_dsl::holidays.find(id))
            .execute(&mut conn)
            .into_domain()
    }
}

impl ExchangeTimeZoneSource for ExchangeRepository {
    fn time_zone_for_exchange(&self, exchange_id: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        exchanges_dsl::exchanges
            .find(exchange_id)
            .select(exchanges_dsl::time_zone)
            .first::<String>(&mut conn)
            .optional()
            .into_domain()
    }
}

/// Full exchange cascade on the caller's transaction: primary-listed
/// instruments with their data, sessions, the exchange's own holidays,
/// secondary-listing links pointing at it, then the exchange row. Returns 0
/// when the exchange does not exist.
pub(crate) fn delete_exchange_tx(conn: &mut DbConnection, id: &str) -> Result<usize> {
    let exists = diesel::select(diesel::dsl::exists(
        exchanges_dsl::exchanges.filter(exchanges_dsl::id.eq(id)),
    ))
    .get_result::<bool>(conn)
    .into_domain()?;
    if !exists {
        return Ok(0);
    }

    let mut removed = 0;
    for instrument_id in instrument_ids_for_primary_exchange_tx(conn, id)? {
        removed += delete_instrument_tx(conn, &instrument_id)?;
    }

    removed += diesel::delete(sessions_dsl::sessions.filter(sessions_dsl::exchange_id.eq(id)))
        .execute(conn)
        .into_domain()?;

    removed += diesel::delete(holidays_dsl::holidays.filter(holidays_dsl::parent_id.eq(id)))
        .execute(conn)
        .into_domain()?;

    removed += delete_secondary_links_for_exchange_tx(conn, id)?;

    removed += diesel::delete(exchanges_dsl::exchanges.find(id))
        .execute(conn)
        .into_domain()?;

    debug!("Exchange {} cascade removed {} rows", id, removed);
    Ok(removed)
}
