//! Shared services for admin handlers.
//!
//! # Services
//!
//! - `category_options` - Cached category lists for the product pickers
//! - `fences` - Per-login request fences for manage tables

pub mod category_options;
pub mod fences;

pub use category_options::CategoryOptions;
pub use fences::FenceRegistry;
