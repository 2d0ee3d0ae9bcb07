//! Unison Core - Shared types library.
//!
//! This crate provides common types used by the Unison storefront. The hosted
//! backend owns every entity; these are the transient, re-fetchable shapes the
//! application works with.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
