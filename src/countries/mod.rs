pub mod countries_model;
pub mod countries_repository;
pub mod countries_traits;

pub use countries_model::Country;
pub use countries_repository::CountryRepository;
pub use countries_traits::CountryStore;
