//! Exchanges, trading sessions and holiday rules.

use chrono::{NaiveTime, Weekday};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// A trading venue. `time_zone` is an IANA zone name, e.g.
/// "America/New_York".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub id: String,
    pub country_id: String,
    pub name: String,
    pub time_zone: String,
    pub parent_id: Option<String>,
}

/// A recurring intraday trading session; wall-clock times, no date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub exchange_id: String,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub name: String,
}

/// Whose calendar a holiday belongs to. One physical `parent_id` column; the
/// tag is carried at the domain layer only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HolidayParent {
    Country(String),
    Exchange(String),
}

impl HolidayParent {
    pub fn id(&self) -> &str {
        match self {
            HolidayParent::Country(id) | HolidayParent::Exchange(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HolidayType {
    /// Fixed calendar date, e.g. December 25th.
    DayOfMonth,
    /// Positional rule, e.g. fourth Thursday of November.
    DayOfWeek,
}

impl HolidayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayType::DayOfMonth => "DayOfMonth",
            HolidayType::DayOfWeek => "DayOfWeek",
        }
    }
}

impl From<&str> for HolidayType {
    fn from(s: &str) -> Self {
        match s {
            "DayOfWeek" => HolidayType::DayOfWeek,
            _ => HolidayType::DayOfMonth,
        }
    }
}

/// What to do when a fixed-date holiday lands on a weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveWeekendHoliday {
    DontMove,
    PreviousBusinessDay,
    NextBusinessDay,
    ClosestBusinessDay,
}

impl MoveWeekendHoliday {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveWeekendHoliday::DontMove => "DontMove",
            MoveWeekendHoliday::PreviousBusinessDay => "PreviousBusinessDay",
            MoveWeekendHoliday::NextBusinessDay => "NextBusinessDay",
            MoveWeekendHoliday::ClosestBusinessDay => "ClosestBusinessDay",
        }
    }
}

impl From<&str> for MoveWeekendHoliday {
    fn from(s: &str) -> Self {
        match s {
            "PreviousBusinessDay" => MoveWeekendHoliday::PreviousBusinessDay,
            "NextBusinessDay" => MoveWeekendHoliday::NextBusinessDay,
            "ClosestBusinessDay" => MoveWeekendHoliday::ClosestBusinessDay,
            _ => MoveWeekendHoliday::DontMove,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: String,
    pub parent: HolidayParent,
    pub holiday_type: HolidayType,
    pub month: u32,
    pub day_of_month: u32,
    pub day_of_week: Weekday,
    pub week_of_month: u32,
    pub move_weekend_holiday: MoveWeekendHoliday,
    pub name: String,
}

pub(crate) fn weekday_to_i32(day: Weekday) -> i32 {
    day.num_days_from_monday() as i32
}

pub(crate) fn weekday_from_i32(value: i32) -> Weekday {
    match value.rem_euclid(7) {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

// =============================================================================
// Database models
// =============================================================================

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::exchanges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeDB {
    pub id: String,
    pub country_id: String,
    pub name: String,
    pub time_zone: String,
    pub parent_id: Option<String>,
}

impl From<&Exchange> for ExchangeDB {
    fn from(domain: &Exchange) -> Self {
        ExchangeDB {
            id: domain.id.clone(),
            country_id: domain.country_id.clone(),
            name: domain.name.clone(),
            time_zone: domain.time_zone.clone(),
            parent_id: domain.parent_id.clone(),
        }
    }
}

impl From<ExchangeDB> for Exchange {
    fn from(db: ExchangeDB) -> Self {
        Exchange {
            id: db.id,
            country_id: db.country_id,
            name: db.name,
            time_zone: db.time_zone,
            parent_id: db.parent_id,
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionDB {
    pub id: String,
    pub exchange_id: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub name: String,
}

impl From<&Session> for SessionDB {
    fn from(domain: &Session) -> Self {
        SessionDB {
            id: domain.id.clone(),
            exchange_id: domain.exchange_id.clone(),
            day_of_week: weekday_to_i32(domain.day_of_week),
            start_time: domain.start_time.format(TIME_OF_DAY_FORMAT).to_string(),
            end_time: domain.end_time.format(TIME_OF_DAY_FORMAT).to_string(),
            name: domain.name.clone(),
        }
    }
}

impl From<SessionDB> for Session {
    fn from(db: SessionDB) -> Self {
        let parse_time = |s: &str| {
            NaiveTime::parse_from_str(s, TIME_OF_DAY_FORMAT)
                .unwrap_or_else(|_| NaiveTime::default())
        };
        Session {
            id: db.id,
            exchange_id: db.exchange_id,
            day_of_week: weekday_from_i32(db.day_of_week),
            start_time: parse_time(&db.start_time),
            end_time: parse_time(&db.end_time),
            name: db.name,
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::holidays)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HolidayDB {
    pub id: String,
    pub parent_id: String,
    pub holiday_type: String,
    pub month: i32,
    pub day_of_month: i32,
    pub day_of_week: i32,
    pub week_of_month: i32,
    pub move_weekend_holiday: String,
    pub name: String,
}

impl From<&Holiday> for HolidayDB {
    fn from(domain: &Holiday) -> Self {
        HolidayDB {
            id: domain.id.clone(),
            parent_id: domain.parent.id().to_string(),
            holiday_type: domain.holiday_type.as_str().to_string(),
            month: domain.month as i32,
            day_of_month: domain.day_of_month as i32,
            day_of_week: weekday_to_i32(domain.day_of_week),
            week_of_month: domain.week_of_month as i32,
            move_weekend_holiday: domain.move_weekend_holiday.as_str().to_string(),
            name: domain.name.clone(),
        }
    }
}

impl HolidayDB {
    /// The parent tag is not stored; the repository resolves it by checking
    /// which entity the id belongs to.
    pub(crate) fn into_domain(self, parent: HolidayParent) -> Holiday {
        Holiday {
            id: self.id,
            parent,
            holiday_type: HolidayType::from(self.holiday_type.as_str()),
            month: self.month as u32,
            day_of_month: self.day_of_month as u32,
            day_of_week: weekday_from_i32(self.day_of_week),
            week_of_month: self.week_of_month as u32,
            move_weekend_holiday: MoveWeekendHoliday::from(self.move_weekend_holiday.as_str()),
            name: self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_round_trips() {
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            assert_eq!(weekday_from_i32(weekday_to_i32(day)), day);
        }
    }

    #[test]
    fn session_times_round_trip() {
        let session = Session {
            id: "s1".to_string(),
            exchange_id: "x1".to_string(),
            day_of_week: Weekday::Fri,
            start_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            name: "regular".to_string(),
        };
        let db = SessionDB::from(&session);
        assert_eq!(db.start_time, "09:30:00");
        assert_eq!(Session::from(db), session);
    }
}
