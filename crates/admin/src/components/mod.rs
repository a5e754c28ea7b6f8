//! Reusable view components for the admin templates.

pub mod data_table;
pub mod filter_bar;
pub mod pagination;
pub mod switch;
pub mod toast;

pub use data_table::DataTableConfig;
pub use pagination::PaginationView;
pub use switch::SwitchView;
pub use toast::{Fragment, Toast};
