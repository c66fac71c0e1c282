//! Command-line host for the CRM core.
//!
//! Supplies the pieces the core leaves to its host: a ureq `Transport`, the
//! token file, configuration, and the text rendering of pages and records.
//! `commands` has one entry point per `crm` subcommand; `browse` drives a
//! `ResourcePage` from line input.

pub mod browse;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod token_store;
pub mod transport;

pub use config::CliConfig;
pub use error::CliError;
pub use token_store::TokenStore;
pub use transport::UreqTransport;
