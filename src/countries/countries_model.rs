use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A country with its ISO 3166 code and home currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: String,
    pub iso_code: String,
    pub name: String,
    pub currency: String,
}

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::countries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CountryDB {
    pub id: String,
    pub iso_code: String,
    pub name: String,
    pub currency: String,
}

impl From<&Country> for CountryDB {
    fn from(domain: &Country) -> Self {
        CountryDB {
            id: domain.id.clone(),
            iso_code: domain.iso_code.clone(),
            name: domain.name.clone(),
            currency: domain.currency.clone(),
        }
    }
}

impl From<CountryDB> for Country {
    fn from(db: CountryDB) -> Self {
        Country {
            id: db.id,
            iso_code: db.iso_code,
            name: db.name,
            currency: db.currency,
        }
    }
}
