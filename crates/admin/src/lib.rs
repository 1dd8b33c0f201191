//! Shopdesk admin library.
//!
//! Back-office for a small online shop: brands, categories, products,
//! customers and orders, plus a dashboard of store counters. The binary in
//! `main.rs` only wires configuration, logging and the listener around
//! [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod models;
pub mod resources;
pub mod routes;
pub mod services;
pub mod state;
