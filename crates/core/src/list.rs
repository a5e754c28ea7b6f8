//! List requests and paged responses.

use serde::{Deserialize, Deserializer, Serialize};

use crate::filters::ListFilters;

/// One page of records: the `data` object of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, rename = "totalPages", deserialize_with = "crate::entities::null_as_default")]
    pub total_pages: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(data: Vec<T>, total_pages: u32) -> Self {
        Self { data, total_pages }
    }

    /// Page count for display: a missing or zero count reads as one page.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.total_pages.max(1)
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 1)
    }
}

/// A list request: page, page size, search text and resource filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<F> {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub filters: F,
}

impl<F: ListFilters> ListQuery<F> {
    #[must_use]
    pub fn new(page: u32, limit: u32, search: impl Into<String>, filters: F) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search: search.into(),
            filters,
        }
    }

    /// Query pairs for the backend `GET /` call.
    ///
    /// `search` is passed through exactly as typed, including when empty.
    #[must_use]
    pub fn api_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("search", self.search.clone()),
        ];
        pairs.extend(self.filters.api_pairs());
        pairs
    }

    /// Dashboard query pairs that reproduce this list at `page`.
    #[must_use]
    pub fn form_pairs(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", page.to_string())];
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs.extend(self.filters.form_pairs());
        pairs
    }
}

/// List state as it arrives in a dashboard query string.
///
/// Every field is lenient: a missing or malformed `page` is page one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams<F> {
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<u32>,
    #[serde(default)]
    pub search: String,
    #[serde(flatten)]
    pub filters: F,
}

impl<F: ListFilters> ListParams<F> {
    #[must_use]
    pub fn into_query(self, limit: u32) -> ListQuery<F> {
        ListQuery::new(self.page.unwrap_or(1), limit, self.search, self.filters)
    }
}

fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{CategoryFilters, NoFilters, SalesFilter};

    #[test]
    fn test_search_is_sent_verbatim() {
        let query = ListQuery::new(1, 5, "abc", NoFilters::default());
        let search = query.api_pairs().into_iter().find(|(k, _)| *k == "search");
        assert_eq!(search, Some(("search", "abc".to_owned())));

        let spaced = ListQuery::new(1, 5, "  thuốc ho ", NoFilters::default());
        assert!(spaced.api_pairs().contains(&("search", "  thuốc ho ".to_owned())));
    }

    #[test]
    fn test_unset_sales_filter_is_absent_from_request() {
        let query = ListQuery::new(2, 5, "", CategoryFilters::default());
        let keys: Vec<_> = query.api_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["page", "limit", "search"]);

        let on_sale = ListQuery::new(
            2,
            5,
            "",
            CategoryFilters {
                is_sales: SalesFilter::ON_SALE,
            },
        );
        assert!(on_sale.api_pairs().contains(&("isSales", "1".to_owned())));
    }

    #[test]
    fn test_page_and_limit_floor_at_one() {
        let query = ListQuery::new(0, 0, "", NoFilters::default());
        assert_eq!((query.page, query.limit), (1, 1));
    }

    #[test]
    fn test_page_count_fallback() {
        let page: Page<u8> = serde_json::from_str(r#"{"data":[1,2]}"#).unwrap();
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page_count(), 1);
    }

    #[test]
    fn test_form_pairs_skip_empty_search() {
        let query = ListQuery::new(3, 5, "", NoFilters::default());
        assert_eq!(query.form_pairs(4), vec![("page", "4".to_owned())]);
    }
}
