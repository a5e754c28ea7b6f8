//! Pharmacy Admin Core - Shared types library.
//!
//! This crate provides the types used across the pharmacy admin components:
//! - `admin` - Server-rendered dashboard over the pharmacy REST API
//! - `cli` - Command-line access to the same resource endpoints
//!
//! # Architecture
//!
//! The core crate contains only types and pure state machines - no I/O, no
//! HTTP clients. The dashboard and the CLI both build on it, and everything
//! here can be tested without a backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and prices
//! - [`entities`] - Backend records and their create/update payloads
//! - [`filters`] - List filters (sales flag, sort order, category set)
//! - [`list`] - List query encoding and the paged response shape
//! - [`pagination`] - Visible page window for the pagination widget
//! - [`fence`] - Monotonic request fence for discarding stale list responses
//! - [`manage`] - Row state for a manage page (inline edit, toggle, delete)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod entities;
pub mod fence;
pub mod filters;
pub mod list;
pub mod manage;
pub mod pagination;
pub mod types;

pub use types::*;
