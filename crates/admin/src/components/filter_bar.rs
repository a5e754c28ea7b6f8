//! View models for the manage page filter widgets.
//!
//! Widgets hold no state of their own: every value comes from the query
//! string and is written back into the filter form.

use pharmacy_admin_core::entities::Category;
use pharmacy_admin_core::filters::{CategorySet, SalesFilter, SortBy};
use pharmacy_admin_core::types::CategoryId;

/// One `<option>` of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

/// The `isSales` dropdown: all, on sale, not on sale.
#[must_use]
pub fn sales_options(current: SalesFilter) -> Vec<SelectOption> {
    SalesFilter::OPTIONS
        .iter()
        .map(|opt| SelectOption::new(opt.form_value(), opt.label(), *opt == current))
        .collect()
}

/// The `sortBy` dropdown. An unset ordering shows as newest.
#[must_use]
pub fn sort_options(current: SortBy) -> Vec<SelectOption> {
    SortBy::ALL
        .iter()
        .map(|opt| SelectOption::new(opt.as_str(), opt.label(), *opt == current))
        .collect()
}

/// A checkbox in the category panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChoice {
    pub id: CategoryId,
    pub name: String,
    pub checked: bool,
}

/// Checkboxes for the category panel, with the committed selection ticked.
#[must_use]
pub fn category_choices(options: &[Category], selected: &CategorySet) -> Vec<CategoryChoice> {
    options
        .iter()
        .map(|c| CategoryChoice {
            id: c.id,
            name: c.name.clone(),
            checked: selected.contains(c.id),
        })
        .collect()
}

/// Options for the single category select on the product form.
#[must_use]
pub fn category_dropdown(options: &[Category], selected: Option<CategoryId>) -> Vec<SelectOption> {
    options
        .iter()
        .map(|c| SelectOption::new(c.id.to_string(), c.name.clone(), Some(c.id) == selected))
        .collect()
}
