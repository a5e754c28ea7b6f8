//! Records mirrored from the pharmacy backend.
//!
//! Field names match the API's snake_case JSON. Optional text fields default
//! to empty so a sparse response still deserializes, and write payloads skip
//! unset fields so `PUT` bodies carry only what changed.

pub mod admin;
pub mod category;
pub mod customer;
pub mod product;
pub mod store;

pub use admin::{Admin, AdminDraft, CreateAdmin, UpdateAdmin};
pub use category::{Category, CategoryDraft, CreateCategory, UpdateCategory};
pub use customer::{Address, CreateCustomer, Customer, Gender, Order, UpdateCustomer};
pub use product::{CategoryRef, Product, ProductInput};
pub use store::{CreateStore, Store, UpdateStore};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Deserialize a backend timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T08:30:00.000Z`) and the bare SQL form
/// (`2024-05-01 08:30:00`, read as UTC). Anything else becomes `None` rather
/// than failing the whole record.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Treat JSON `null` the same as a missing string.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treat JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-05-01T08:30:00.000Z").unwrap();
        assert_eq!((rfc.month(), rfc.day(), rfc.hour()), (5, 1, 8));

        let sql = parse_timestamp("2024-05-01 08:30:00").unwrap();
        assert_eq!(sql, rfc);

        let date = parse_timestamp("2001-12-24").unwrap();
        assert_eq!((date.year(), date.hour()), (2001, 0));

        assert!(parse_timestamp("yesterday").is_none());
    }
}
