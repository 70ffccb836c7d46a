use crate::errors::Result;
use crate::exchanges::exchanges_model::{Exchange, Holiday, Session};

/// Persistence of exchanges, their sessions and holiday calendars.
pub trait ExchangeStore: Send + Sync {
    fn create_exchange(&self, exchange: Exchange) -> Result<Exchange>;
    fn update_exchange(&self, exchange: Exchange) -> Result<Exchange>;
    fn get_exchange(&self, id: &str) -> Result<Option<Exchange>>;
    fn list_exchanges(&self) -> Result<Vec<Exchange>>;
    /// Deletes the exchange and everything hanging off it: sessions, its
    /// holidays, instruments primarily listed on it (with their market data)
    /// and secondary-listing links. Returns the total rows removed; 0 when
    /// the exchange does not exist.
    fn delete_exchange(&self, id: &str) -> Result<usize>;

    fn create_session(&self, session: Session) -> Result<Session>;
    fn update_session(&self, session: Session) -> Result<Session>;
    fn get_session(&self, id: &str) -> Result<Option<Session>>;
    fn list_sessions(&self, exchange_id: &str) -> Result<Vec<Session>>;
    fn delete_session(&self, id: &str) -> Result<usize>;

    fn create_holiday(&self, holiday: Holiday) -> Result<Holiday>;
    fn update_holiday(&self, holiday: Holiday) -> Result<Holiday>;
    fn get_holiday(&self, id: &str) -> Result<Option<Holiday>>;
    /// Holidays attached to the given country or exchange id.
    fn list_holidays(&self, parent_id: &str) -> Result<Vec<Holiday>>;
    fn delete_holiday(&self, id: &str) -> Result<usize>;
}

/// Minimal lookup the feed needs to render timestamps in exchange time.
pub trait ExchangeTimeZoneSource: Send + Sync {
    fn time_zone_for_exchange(&self, exchange_id: &str) -> Result<Option<String>>;
}
