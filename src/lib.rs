//! netspace: search FOFA, Hunter and Quake for the assets of a batch of
//! IPs, domains or companies, merge the answers and export them.
//!
//! The search core lives in the `netspace-search` crate. This crate adds
//! the configuration file, target input, terminal output, export and the
//! interactive mode.

pub mod app;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod input;
pub mod interactive;

pub use config::AppConfig;
pub use error::{AppError, Result};
