//! Dashboard-side models.
//!
//! Backend records live in `pharmacy_admin_core::entities`; this module only
//! holds what the dashboard itself keeps in the session.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
