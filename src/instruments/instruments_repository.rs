//! SQLite repository for instruments and instrument groups.

use diesel::prelude::*;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

use super::instruments_model::{
    Instrument, InstrumentDB, InstrumentGroup, InstrumentGroupDB, InstrumentGroupMemberDB,
    InstrumentSecondaryExchangeDB,
};
use super::instruments_traits::InstrumentStore;
use crate::constants::INSTRUMENT_GROUP_ROOT_ID;
use crate::db::{get_connection, DbConnection, DbPool, DbTransactionExecutor};
use crate::errors::{DatabaseError, Error, IntoDomain, Result};
use crate::fundamentals::fundamentals_repository::delete_instrument_associations_tx;
use crate::market_data::market_data_repository::{
    delete_bars_for_ticker_tx, delete_ticks_for_ticker_tx,
};
use crate::schema::instrument_group_members::dsl as members_dsl;
use crate::schema::instrument_groups::dsl as groups_dsl;
use crate::schema::instrument_secondary_exchanges::dsl as secondary_dsl;
use crate::schema::instruments::dsl as instruments_dsl;

pub struct InstrumentRepository {
    pool: Arc<DbPool>,
}

impl InstrumentRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn populate(&self, conn: &mut DbConnection, mut instrument: Instrument) -> Result<Instrument> {
        instrument.secondary_exchange_ids = secondary_dsl::instrument_secondary_exchanges
            .filter(secondary_dsl::instrument_id.eq(&instrument.id))
            .select(secondary_dsl::exchange_id)
            .order(secondary_dsl::exchange_id.asc())
            .load::<String>(conn)
            .into_domain()?;

        instrument.instrument_group_ids = members_dsl::instrument_group_members
            .filter(members_dsl::instrument_id.eq(&instrument.id))
            .select(members_dsl::instrument_group_id)
            .order(members_dsl::instrument_group_id.asc())
            .load::<String>(conn)
            .into_domain()?;

        Ok(instrument)
    }
}

impl InstrumentStore for InstrumentRepository {
    fn create(&self, instrument: &Instrument) -> Result<Instrument> {
        let mut domain = instrument.clone();
        if domain.id.is_empty() {
            domain.id = uuid::Uuid::new_v4().to_string();
        }

        self.pool.execute(move |conn| {
            let row = InstrumentDB::from(&domain);
            diesel::insert_into(instruments_dsl::instruments)
                .values(&row)
                .execute(conn)
                .into_domain()?;

            for exchange_id in &domain.secondary_exchange_ids {
                diesel::insert_into(secondary_dsl::instrument_secondary_exchanges)
                    .values(&InstrumentSecondaryExchangeDB {
                        instrument_id: domain.id.clone(),
                        exchange_id: exchange_id.clone(),
                    })
                    .execute(conn)
                    .into_domain()?;
            }

            for group_id in &domain.instrument_group_ids {
                diesel::insert_into(members_dsl::instrument_group_members)
                    .values(&InstrumentGroupMemberDB {
                        instrument_group_id: group_id.clone(),
                        instrument_id: domain.id.clone(),
                    })
                    .execute(conn)
                    .into_domain()?;
            }

            Ok(domain)
        })
    }

    fn update(&self, instrument: &Instrument) -> Result<Instrument> {
        let domain = instrument.clone();

        self.pool.execute(move |conn| {
            let row = InstrumentDB::from(&domain);
            let affected = diesel::update(instruments_dsl::instruments.find(&row.id))
                .set(&row)
                .execute(conn)
                .into_domain()?;
            if affected == 0 {
                return Err(Error::Database(DatabaseError::NotFound(format!(
                    "Instrument with id {} not found",
                    row.id
                ))));
            }

            // Reconcile the secondary-exchange set: apply only the delta.
            let current: Vec<String> = secondary_dsl::instrument_secondary_exchanges
                .filter(secondary_dsl::instrument_id.eq(&domain.id))
                .select(secondary_dsl::exchange_id)
                .load::<String>(conn)
                .into_domain()?;
            let (added, removed) = diff_sets(&current, &domain.secondary_exchange_ids);
            if !removed.is_empty() {
                diesel::delete(
                    secondary_dsl::instrument_secondary_exchanges
                        .filter(secondary_dsl::instrument_id.eq(&domain.id))
                        .filter(secondary_dsl::exchange_id.eq_any(&removed)),
                )
                .execute(conn)
                .into_domain()?;
            }
            for exchange_id in added {
                diesel::insert_into(secondary_dsl::instrument_secondary_exchanges)
                    .values(&InstrumentSecondaryExchangeDB {
                        instrument_id: domain.id.clone(),
                        exchange_id,
                    })
                    .execute(conn)
                    .into_domain()?;
            }

            // Reconcile group memberships the same way.
            let current: Vec<String> = members_dsl::instrument_group_members
                .filter(members_dsl::instrument_id.eq(&domain.id))
                .select(members_dsl::instrument_group_id)
                .load::<String>(conn)
                .into_domain()?;
            let (added, removed) = diff_sets(&current, &domain.instrument_group_ids);
            if !removed.is_empty() {
                diesel::delete(
                    members_dsl::instrument_group_members
                        .filter(members_dsl::instrument_id.eq(&domain.id))
                        .filter(members_dsl::instrument_group_id.eq_any(&removed)),
                )
                .execute(conn)
                .into_domain()?;
            }
            for group_id in added {
                diesel::insert_into(members_dsl::instrument_group_members)
                    .values(&InstrumentGroupMemberDB {
                        instrument_group_id: group_id,
                        instrument_id: domain.id.clone(),
                    })
                    .execute(conn)
                    .into_domain()?;
            }

            Ok(domain)
        })
    }

    fn get(&self, id: &str) -> Result<Option<Instrument>> {
        let mut conn = get_connection(&self.pool)?;
        let row = instruments_dsl::instruments
            .find(id)
            .first::<InstrumentDB>(&mut conn)
            .optional()
            .into_domain()?;

        match row {
            Some(db) => Ok(Some(self.populate(&mut conn, Instrument::from(db))?)),
            None => Ok(None),
        }
    }

    fn get_by_ticker(&self, ticker: &str) -> Result<Option<Instrument>> {
        let mut conn = get_connection(&self.pool)?;
        let row = instruments_dsl::instruments
            .filter(instruments_dsl::ticker.eq(ticker))
            .first::<InstrumentDB>(&mut conn)
            .optional()
            .into_domain()?;

        match row {
            Some(db) => Ok(Some(self.populate(&mut conn, Instrument::from(db))?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<Instrument>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = instruments_dsl::instruments
            .order(instruments_dsl::ticker.asc())
            .load::<InstrumentDB>(&mut conn)
            .into_domain()?;

        rows.into_iter()
            .map(|db| self.populate(&mut conn, Instrument::from(db)))
            .collect()
    }

    fn delete(&self, id: &str) -> Result<usize> {
        let id = id.to_string();
        self.pool.execute(move |conn| delete_instrument_tx(conn, &id))
    }

    fn create_group(&self, group: &InstrumentGroup) -> Result<InstrumentGroup> {
        let mut domain = group.clone();
        if domain.id.is_empty() {
            domain.id = uuid::Uuid::new_v4().to_string();
        }
        domain.parent_id = domain.effective_parent_id().to_string();

        self.pool.execute(move |conn| {
            diesel::insert_into(groups_dsl::instrument_groups)
                .values(&InstrumentGroupDB::from(&domain))
                .execute(conn)
                .into_domain()?;

            for instrument_id in &domain.instrument_ids {
                diesel::insert_into(members_dsl::instrument_group_members)
                    .values(&InstrumentGroupMemberDB {
                        instrument_group_id: domain.id.clone(),
                        instrument_id: instrument_id.clone(),
                    })
                    .execute(conn)
                    .into_domain()?;
            }

            Ok(domain)
        })
    }

    fn update_group(&self, group: &InstrumentGroup) -> Result<InstrumentGroup> {
        let mut domain = group.clone();
        domain.parent_id = domain.effective_parent_id().to_string();

        self.pool.execute(move |conn| {
            let row = InstrumentGroupDB::from(&domain);
            let affected = diesel::update(groups_dsl::instrument_groups.find(&row.id))
                .set(&row)
                .execute(conn)
                .into_domain()?;
            if affected == 0 {
                return Err(Error::Database(DatabaseError::NotFound(format!(
                    "InstrumentGroup with id {} not found",
                    row.id
                ))));
            }

            let current: Vec<String> = members_dsl::instrument_group_members
                .filter(members_dsl::instrument_group_id.eq(&domain.id))
                .select(members_dsl::instrument_id)
                .load::<String>(conn)
                .into_domain()?;
            let (added, removed) = diff_sets(&current, &domain.instrument_ids);
            if !removed.is_empty() {
                diesel::delete(
                    members_dsl::instrument_group_members
                        .filter(members_dsl::instrument_group_id.eq(&domain.id))
                        .filter(members_dsl::instrument_id.eq_any(&removed)),
                )
                .execute(conn)
                .into_domain()?;
            }
            for instrument_id in added {
                diesel::insert_into(members_dsl::instrument_group_members)
                    .values(&InstrumentGroupMemberDB {
                        instrument_group_id: domain.id.clone(),
                        instrument_id,
                    })
                    .execute(conn)
                    .into_domain()?;
            }

            Ok(domain)
        })
    }

    fn get_group(&self, id: &str) -> Result<Option<InstrumentGroup>> {
        let mut conn = get_connection(&self.pool)?;
        let row = groups_dsl::instrument_groups
            .find(id)
            .first::<InstrumentGroupDB>(&mut conn)
            .optional()
            .into_domain()?;

        match row {
            Some(db) => {
                let mut group = InstrumentGroup::from(db);
                group.instrument_ids = members_dsl::instrument_group_members
                    .filter(members_dsl::instrument_group_id.eq(&group.id))
                    .select(members_dsl::instrument_id)
                    .order(members_dsl::instrument_id.asc())
                    .load::<String>(&mut conn)
                    .into_domain()?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    fn list_groups(&self) -> Result<Vec<InstrumentGroup>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = groups_dsl::instrument_groups
            .order(groups_dsl::name.asc())
            .load::<InstrumentGroupDB>(&mut conn)
            .into_domain()?;

        let mut groups = Vec::with_capacity(rows.len());
        for db in rows {
            let mut group = InstrumentGroup::from(db);
            group.instrument_ids = members_dsl::instrument_group_members
                .filter(members_dsl::instrument_group_id.eq(&group.id))
                .select(members_dsl::instrument_id)
                .order(members_dsl::instrument_id.asc())
                .load::<String>(&mut conn)
                .into_domain()?;
            groups.push(group);
        }
        Ok(groups)
    }

    fn delete_group(&self, id: &str) -> Result<usize> {
        let id = id.to_string();
        self.pool.execute(move |conn| {
            // Children survive: re-parent them to the root sentinel.
            diesel::update(groups_dsl::instrument_groups.filter(groups_dsl::parent_id.eq(&id)))
                .set(groups_dsl::parent_id.eq(INSTRUMENT_GROUP_ROOT_ID))
                .execute(conn)
                .into_domain()?;

            let mut removed = diesel::delete(
                members_dsl::instrument_group_members
                    .filter(members_dsl::instrument_group_id.eq(&id)),
            )
            .execute(conn)
            .into_domain()?;

            removed += diesel::delete(groups_dsl::instrument_groups.find(&id))
                .execute(conn)
                .into_domain()?;

            Ok(removed)
        })
    }
}

/// Added/removed delta between the persisted set and the requested set.
fn diff_sets(current: &[String], desired: &[String]) -> (Vec<String>, Vec<String>) {
    let current_set: HashSet<&String> = current.iter().collect();
    let desired_set: HashSet<&String> = desired.iter().collect();

    let added = desired
        .iter()
        .filter(|v| !current_set.contains(*v))
        .cloned()
        .collect();
    let removed = current
        .iter()
        .filter(|v| !desired_set.contains(*v))
        .cloned()
        .collect();
    (added, removed)
}

// =============================================================================
// Transaction-scoped cascade helpers
// =============================================================================

/// Full instrument cascade on the caller's transaction: time-series rows for
/// every provider and partition, association rows, then the instrument row.
pub(crate) fn delete_instrument_tx(conn: &mut DbConnection, id: &str) -> Result<usize> {
    let row = instruments_dsl::instruments
        .find(id)
        .first::<InstrumentDB>(conn)
        .optional()
        .into_domain()?;

    let row = match row {
        Some(r) => r,
        None => return Ok(0),
    };

    let mut removed = 0;
    removed += delete_bars_for_ticker_tx(conn, &row.ticker)?;
    removed += delete_ticks_for_ticker_tx(conn, &row.ticker)?;

    removed += diesel::delete(
        members_dsl::instrument_group_members.filter(members_dsl::instrument_id.eq(id)),
    )
    .execute(conn)
    .into_domain()?;

    removed += diesel::delete(
        secondary_dsl::instrument_secondary_exchanges.filter(secondary_dsl::instrument_id.eq(id)),
    )
    .execute(conn)
    .into_domain()?;

    removed += delete_instrument_associations_tx(conn, id)?;

    removed += diesel::delete(instruments_dsl::instruments.find(id))
        .execute(conn)
        .into_domain()?;

    debug!("Instrument {} cascade removed {} rows", id, removed);
    Ok(removed)
}

/// Ids of instruments primarily listed on one exchange.
pub(crate) fn instrument_ids_for_primary_exchange_tx(
    conn: &mut DbConnection,
    exchange_id: &str,
) -> Result<Vec<String>> {
    instruments_dsl::instruments
        .filter(instruments_dsl::primary_exchange_id.eq(exchange_id))
        .select(instruments_dsl::id)
        .load::<String>(conn)
        .into_domain()
}

/// Removes secondary-listing links into one exchange from instruments that
/// are not themselves being deleted.
pub(crate) fn delete_secondary_links_for_exchange_tx(
    conn: &mut DbConnection,
    exchange_id: &str,
) -> Result<usize> {
    diesel::delete(
        secondary_dsl::instrument_secondary_exchanges
            .filter(secondary_dsl::exchange_id.eq(exchange_id)),
    )
    .execute(conn)
    .into_domain()
}
