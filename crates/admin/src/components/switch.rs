//! The status switch shown in every manage table row.

use std::fmt::Display;

/// A toggle bound to `PATCH {base}/{id}/status`.
///
/// `current` is posted back with the toggle so the response can render the
/// flipped switch without refetching the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchView {
    pub url: String,
    pub checked: bool,
    pub confirm: String,
    /// DOM id, so the response replaces exactly this switch.
    pub dom_id: String,
}

impl SwitchView {
    /// `noun` is the Vietnamese entity name used in the confirmation, e.g.
    /// `sản phẩm`.
    #[must_use]
    pub fn new(base_path: &str, table_id: &str, noun: &str, id: impl Display, checked: bool) -> Self {
        Self {
            url: format!("{base_path}/{id}/status"),
            checked,
            confirm: format!("Bạn có chắc chắn thay đổi trạng thái {noun} #{id}?"),
            dom_id: format!("{table_id}-status-{id}"),
        }
    }

    /// The same switch after a successful toggle.
    #[must_use]
    pub fn flipped(mut self) -> Self {
        self.checked = !self.checked;
        self
    }

    /// Value posted as `current`.
    #[must_use]
    pub const fn current_value(&self) -> &'static str {
        if self.checked { "true" } else { "false" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_urls_and_confirm() {
        let switch = SwitchView::new("/products", "products", "sản phẩm", 7, true);
        assert_eq!(switch.url, "/products/7/status");
        assert_eq!(switch.confirm, "Bạn có chắc chắn thay đổi trạng thái sản phẩm #7?");
        assert_eq!(switch.dom_id, "products-status-7");
        assert_eq!(switch.current_value(), "true");
    }

    #[test]
    fn test_flip_twice_restores() {
        let switch = SwitchView::new("/stores", "stores", "cửa hàng", 1, false);
        assert_eq!(switch.clone().flipped().flipped(), switch);
    }
}
