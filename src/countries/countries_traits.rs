use crate::countries::countries_model::Country;
use crate::errors::Result;

pub trait CountryStore: Send + Sync {
    fn create(&self, country: Country) -> Result<Country>;
    fn update(&self, country: Country) -> Result<Country>;
    fn get(&self, id: &str) -> Result<Option<Country>>;
    fn get_by_iso_code(&self, iso_code: &str) -> Result<Option<Country>>;
    fn list(&self) -> Result<Vec<Country>>;
    /// Deletes the country and everything reachable from it: its exchanges
    /// (each with the full exchange cascade), its holidays and its
    /// fundamental associations with their values. Returns the total rows
    /// removed; 0 when the country does not exist.
    fn delete(&self, id: &str) -> Result<usize>;
}
