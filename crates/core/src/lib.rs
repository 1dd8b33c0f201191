//! Shopdesk Core - Shared domain types library.
//!
//! This crate provides the types used across all Shopdesk components:
//! - `admin` - The back-office server (brands, products, customers, orders)
//! - `cli` - Command-line tools for migrations, seeding and stats
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Everything with a testable rule (slug derivation, price
//! format, line totals, the monthly chart series, the order badge threshold)
//! lives here so it can be exercised without a running database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, prices, slugs, statuses and
//!   dashboard aggregates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
