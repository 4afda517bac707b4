//! Costbook - cost and inventory bookkeeping for small food businesses
//!
//! This library provides the core functionality for the Costbook CLI. It
//! records movements (sales, purchases, expenses and stock adjustments),
//! and derives filtered views of them with inflow/outflow totals.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (movements, lines, money)
//! - `storage`: JSON file storage layer and the movement source trait
//! - `services`: Filter engine, browsing session, movement management
//! - `display`: Terminal formatting
//! - `export`: CSV/JSON/YAML export of a filtered view
//! - `assistant`: Hosted-model chat and ingredient scanning
//! - `cli`: Command handlers for the `costbook` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use costbook_cli::config::{CostbookPaths, Settings};
//! use costbook_cli::services::{apply_filter, FilterSpec};
//! use costbook_cli::storage::{MovementSource, Storage};
//!
//! let paths = CostbookPaths::new()?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let records = storage.fetch_movements()?;
//! let view = apply_filter(&records, &FilterSpec::new().search("acme"));
//! println!("{} in, {} out", view.inflow_total, view.outflow_total);
//! ```

pub mod assistant;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::CostbookError;
