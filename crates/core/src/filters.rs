//! List filters and how they are encoded for the backend.
//!
//! Each filter knows two encodings: the form value used by the dashboard's
//! own query strings and select options, and the wire value sent to the
//! API. An unset filter produces no API parameter at all.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::types::CategoryId;

/// The sales-flag dropdown: all, on sale, or not on sale.
///
/// Form values are `""`, `"true"` and `"false"`. On the wire the flag is
/// `isSales=1` / `isSales=0`, and omitted entirely when unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SalesFilter(Option<bool>);

impl SalesFilter {
    pub const ALL: Self = Self(None);
    pub const ON_SALE: Self = Self(Some(true));
    pub const NOT_ON_SALE: Self = Self(Some(false));

    /// Every dropdown option, in display order.
    pub const OPTIONS: [Self; 3] = [Self::ALL, Self::ON_SALE, Self::NOT_ON_SALE];

    #[must_use]
    pub const fn new(value: Option<bool>) -> Self {
        Self(value)
    }

    /// Parse a dropdown value. Anything other than `"true"`/`"false"` is unset.
    #[must_use]
    pub fn from_form(value: &str) -> Self {
        match value {
            "true" => Self::ON_SALE,
            "false" => Self::NOT_ON_SALE,
            _ => Self::ALL,
        }
    }

    #[must_use]
    pub const fn as_option(self) -> Option<bool> {
        self.0
    }

    #[must_use]
    pub const fn form_value(self) -> &'static str {
        match self.0 {
            None => "",
            Some(true) => "true",
            Some(false) => "false",
        }
    }

    /// Value of the `isSales` API parameter, if any.
    #[must_use]
    pub const fn wire_value(self) -> Option<&'static str> {
        match self.0 {
            None => None,
            Some(true) => Some("1"),
            Some(false) => Some("0"),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self.0 {
            None => "Tất cả",
            Some(true) => "Đang bán",
            Some(false) => "Chưa bán",
        }
    }
}

impl<'de> Deserialize<'de> for SalesFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_form(&raw))
    }
}

impl Serialize for SalesFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.form_value())
    }
}

/// Error for an unknown sort key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order: {0:?}")]
pub struct UnknownSortBy(pub String);

/// Product list ordering. A closed set; there is no free-form sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    BestSelling,
}

impl SortBy {
    pub const ALL: [Self; 4] = [Self::Newest, Self::PriceAsc, Self::PriceDesc, Self::BestSelling];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::BestSelling => "best_selling",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Mới nhất",
            Self::PriceAsc => "Giá tăng dần",
            Self::PriceDesc => "Giá giảm dần",
            Self::BestSelling => "Bán chạy",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = UnknownSortBy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| UnknownSortBy(s.to_owned()))
    }
}

/// Categories picked in the multi-select panel.
///
/// Kept in selection order without duplicates. Encoded as `1,2,3`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategorySet(Vec<CategoryId>);

impl CategorySet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a comma-joined list, skipping blank or malformed entries.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.split(',')
            .filter_map(|part| part.parse::<CategoryId>().ok())
            .collect()
    }

    pub fn insert(&mut self, id: CategoryId) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    #[must_use]
    pub fn contains(&self, id: CategoryId) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.0.iter().copied()
    }

    /// `1,2,3`, or empty for no selection.
    #[must_use]
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<CategoryId> for CategorySet {
    fn from_iter<I: IntoIterator<Item = CategoryId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'de> Deserialize<'de> for CategorySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl Serialize for CategorySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.joined())
    }
}

/// Resource-specific list parameters appended after `page`, `limit` and
/// `search`.
pub trait ListFilters {
    /// API query pairs for the set filters. Unset filters are skipped.
    fn api_pairs(&self) -> Vec<(&'static str, String)>;

    /// Dashboard query pairs that reproduce this filter state in a link.
    fn form_pairs(&self) -> Vec<(&'static str, String)>;
}

/// Lists with no filters beyond search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct NoFilters {}

impl ListFilters for NoFilters {
    fn api_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn form_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Category list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct CategoryFilters {
    #[serde(default, rename = "isSales")]
    pub is_sales: SalesFilter,
}

impl ListFilters for CategoryFilters {
    fn api_pairs(&self) -> Vec<(&'static str, String)> {
        self.is_sales
            .wire_value()
            .map(|v| ("isSales", v.to_owned()))
            .into_iter()
            .collect()
    }

    fn form_pairs(&self) -> Vec<(&'static str, String)> {
        if self.is_sales.as_option().is_some() {
            vec![("isSales", self.is_sales.form_value().to_owned())]
        } else {
            Vec::new()
        }
    }
}

/// Product list filters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ProductFilters {
    #[serde(default, rename = "isSales")]
    pub is_sales: SalesFilter,
    #[serde(default)]
    pub categories: CategorySet,
    #[serde(default, rename = "sortBy", deserialize_with = "optional_sort")]
    pub sort_by: Option<SortBy>,
}

impl ProductFilters {
    /// The ordering shown in the dropdown: unset displays as newest.
    #[must_use]
    pub fn displayed_sort(&self) -> SortBy {
        self.sort_by.unwrap_or_default()
    }
}

impl ListFilters for ProductFilters {
    fn api_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.is_sales.wire_value() {
            pairs.push(("isSales", v.to_owned()));
        }
        if !self.categories.is_empty() {
            pairs.push(("categories", self.categories.joined()));
        }
        if let Some(sort) = self.sort_by {
            pairs.push(("sortBy", sort.as_str().to_owned()));
        }
        pairs
    }

    fn form_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.is_sales.as_option().is_some() {
            pairs.push(("isSales", self.is_sales.form_value().to_owned()));
        }
        if !self.categories.is_empty() {
            pairs.push(("categories", self.categories.joined()));
        }
        if let Some(sort) = self.sort_by {
            pairs.push(("sortBy", sort.as_str().to_owned()));
        }
        pairs
    }
}

/// `sortBy=` (empty) and unknown keys both mean unset.
fn optional_sort<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SortBy>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}
