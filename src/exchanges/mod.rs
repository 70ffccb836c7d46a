pub mod exchanges_model;
pub mod exchanges_repository;
pub mod exchanges_traits;

pub use exchanges_model::{
    Exchange, Holiday, HolidayParent, HolidayType, MoveWeekendHoliday, Session,
};
pub use exchanges_repository::ExchangeRepository;
pub use exchanges_traits::{ExchangeStore, ExchangeTimeZoneSource};
