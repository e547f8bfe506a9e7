//! Read-only query logic behind the JSON endpoints. Every function works on
//! borrowed views of the shared [`Dataset`](crate::data::Dataset) and never
//! mutates it.
pub mod country;
pub mod params;
pub mod rates;
pub mod top;

pub use country::{country_detail, CountryDetail, CountryNotFound};
pub use rates::{list_rates, RatesPage, RatesParams};
pub use top::{top_rates, TopRates};
