//! Custom Askama template filters and display helpers.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Shown in place of a blank optional field.
pub const UNSET: &str = "Chưa cập nhật";

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Replaces a blank value with "Chưa cập nhật".
///
/// Usage in templates: `{{ customer.phonenumber|or_unset }}`
#[askama::filter_fn]
pub fn or_unset(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(or_unset_str(&value.to_string()))
}

fn or_unset_str(value: &str) -> String {
    if value.trim().is_empty() {
        UNSET.to_string()
    } else {
        value.to_string()
    }
}

/// `dd/mm/yyyy`, or "Chưa cập nhật".
#[must_use]
pub fn display_date(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(|| UNSET.to_string(), |d| d.format("%d/%m/%Y").to_string())
}

/// `dd/mm/yyyy HH:MM`, or "Chưa cập nhật".
#[must_use]
pub fn display_datetime(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(
        || UNSET.to_string(),
        |d| d.format("%d/%m/%Y %H:%M").to_string(),
    )
}
