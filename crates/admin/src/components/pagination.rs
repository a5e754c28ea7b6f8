//! Pagination links for manage tables.

use pharmacy_admin_core::filters::ListFilters;
use pharmacy_admin_core::list::ListQuery;
use pharmacy_admin_core::pagination::PageWindow;

/// Encode query pairs as `k=v&k=v`.
#[must_use]
pub fn query_string(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// A link to one page of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: u32,
    /// Fragment URL the link swaps in.
    pub table_url: String,
    /// Full page URL pushed to the address bar.
    pub page_url: String,
    pub current: bool,
}

/// Everything the pagination partial renders.
#[derive(Debug, Clone)]
pub struct PaginationView {
    pub label: String,
    /// Fragment URL of the displayed page, used to refresh the table in place.
    pub current_url: String,
    pub prev: Option<PageLink>,
    pub next: Option<PageLink>,
    pub pages: Vec<PageLink>,
}

impl PaginationView {
    /// Links for `window`, keeping the search and filters of `query`.
    ///
    /// `base` is the manage page path, e.g. `/products`.
    #[must_use]
    pub fn new<F: ListFilters>(base: &str, query: &ListQuery<F>, window: &PageWindow) -> Self {
        let link = |number: u32| {
            let qs = query_string(&query.form_pairs(number));
            PageLink {
                number,
                table_url: format!("{base}/table?{qs}"),
                page_url: format!("{base}?{qs}"),
                current: number == window.current,
            }
        };

        Self {
            label: window.label(),
            current_url: link(window.current).table_url,
            prev: window.prev().map(link),
            next: window.next().map(link),
            pages: window.pages.clone().map(link).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pharmacy_admin_core::filters::{NoFilters, ProductFilters, SalesFilter};

    use super::*;

    #[test]
    fn test_links_keep_search_and_filters() {
        let filters = ProductFilters {
            is_sales: SalesFilter::ON_SALE,
            ..ProductFilters::default()
        };
        let query = ListQuery::new(2, 5, "vitamin c", filters);
        let view = PaginationView::new("/products", &query, &PageWindow::new(2, 4));

        let next = view.next.unwrap();
        assert_eq!(next.number, 3);
        assert_eq!(next.table_url, "/products/table?page=3&search=vitamin%20c&isSales=true");
        assert_eq!(next.page_url, "/products?page=3&search=vitamin%20c&isSales=true");
        assert_eq!(view.label, "Trang 2 / 4");
        assert_eq!(view.current_url, "/products/table?page=2&search=vitamin%20c&isSales=true");
    }

    #[test]
    fn test_single_page_has_no_prev_or_next() {
        let query = ListQuery::new(1, 5, "", NoFilters {});
        let view = PaginationView::new("/stores", &query, &PageWindow::new(1, 1));
        assert!(view.prev.is_none());
        assert!(view.next.is_none());
        assert_eq!(view.pages.len(), 1);
        assert!(view.pages.first().unwrap().current);
    }

    #[test]
    fn test_query_string_encodes_values() {
        assert_eq!(
            query_string(&[("search", "a&b".to_string()), ("categories", "1,2".to_string())]),
            "search=a%26b&categories=1%2C2"
        );
    }
}
