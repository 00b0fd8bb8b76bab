//! Core domain + pipeline logic for msgwait.
//!
//! This crate is framework-agnostic. The messaging transport and the
//! subscription-registration service live behind ports (traits) implemented in
//! adapter crates.

pub mod backfill;
pub mod config;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod links;
pub mod logging;
pub mod ports;
pub mod router;
pub mod stats;

pub use errors::{Error, Result};
