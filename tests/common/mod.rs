//! Shared SQLite fixture for store-backed tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc, Weekday};
use rust_decimal_macros::dec;
use tempfile::TempDir;

use tickstore::countries::Country;
use tickstore::db::{self, DbPool};
use tickstore::exchanges::{Exchange, Holiday, HolidayParent, HolidayType, MoveWeekendHoliday, Session};
use tickstore::instruments::{Instrument, InstrumentType};
use tickstore::market_data::Bar;

/// A freshly migrated database in a temp directory. The schema is reverted
/// and the directory removed on drop.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    _dir: TempDir,
}

pub fn setup() -> TestDb {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("tickstore-test.db");
    let db_path = db_path.to_str().expect("utf-8 path").to_string();
    db::init(dir.path().to_str().expect("utf-8 path")).expect("init database");
    let pool = db::create_pool(&db_path).expect("create pool");
    db::run_migrations(&pool).expect("run migrations");
    TestDb { pool, _dir: dir }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = db::revert_schema(&self.pool);
    }
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

pub fn country(id: &str, iso_code: &str) -> Country {
    Country {
        id: id.to_string(),
        iso_code: iso_code.to_string(),
        name: format!("Country {}", iso_code),
        currency: "USD".to_string(),
    }
}

pub fn exchange(id: &str, country_id: &str, time_zone: &str) -> Exchange {
    Exchange {
        id: id.to_string(),
        country_id: country_id.to_string(),
        name: format!("Exchange {}", id),
        time_zone: time_zone.to_string(),
        parent_id: None,
    }
}

pub fn session(id: &str, exchange_id: &str) -> Session {
    Session {
        id: id.to_string(),
        exchange_id: exchange_id.to_string(),
        day_of_week: Weekday::Mon,
        start_time: chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        end_time: chrono::NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        name: "regular".to_string(),
    }
}

pub fn holiday(id: &str, parent: HolidayParent, name: &str) -> Holiday {
    Holiday {
        id: id.to_string(),
        parent,
        holiday_type: HolidayType::DayOfMonth,
        month: 12,
        day_of_month: 25,
        day_of_week: Weekday::Mon,
        week_of_month: 0,
        move_weekend_holiday: MoveWeekendHoliday::NextBusinessDay,
        name: name.to_string(),
    }
}

pub fn instrument(id: &str, ticker: &str, primary_exchange_id: &str) -> Instrument {
    Instrument {
        id: id.to_string(),
        instrument_type: InstrumentType::Stock,
        ticker: ticker.to_string(),
        name: format!("Instrument {}", ticker),
        description: String::new(),
        primary_exchange_id: primary_exchange_id.to_string(),
        inception_date: utc(2000, 1, 3, 0, 0, 0),
        secondary_exchange_ids: Vec::new(),
        instrument_group_ids: Vec::new(),
    }
}

/// `count` consecutive minute bars starting at `start`, one minute apart.
pub fn minute_bars(ticker: &str, start: DateTime<Utc>, count: i64) -> Vec<Bar> {
    (0..count)
        .map(|i| Bar {
            ticker: ticker.to_string(),
            timestamp: start + chrono::Duration::minutes(i),
            open: dec!(100) + rust_decimal::Decimal::from(i),
            high: dec!(110) + rust_decimal::Decimal::from(i),
            low: dec!(90) + rust_decimal::Decimal::from(i),
            close: dec!(105) + rust_decimal::Decimal::from(i),
            volume: dec!(10),
            synthetic: false,
        })
        .collect()
}

/// `count` consecutive day bars starting at `start`, one day apart.
pub fn day_bars(ticker: &str, start: DateTime<Utc>, count: i64) -> Vec<Bar> {
    (0..count)
        .map(|i| Bar {
            ticker: ticker.to_string(),
            timestamp: start + chrono::Duration::days(i),
            open: dec!(100),
            high: dec!(110),
            low: dec!(90),
            close: dec!(105),
            volume: dec!(10),
            synthetic: false,
        })
        .collect()
}
