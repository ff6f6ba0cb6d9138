//! hunkwise: inline diff review engine (library crate).
//!
//! Re-exports public modules for integration tests and editor hosts.

pub mod anchor;
pub mod commands;
pub mod config;
pub mod constants;
pub mod diff;
pub mod editor;
pub mod env;
pub mod host;
pub mod models;
pub mod output;
pub mod review;
pub mod store;
