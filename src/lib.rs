//! pocketbook - personal finance ledger with remote sync
//!
//! This library provides the core functionality for the pocketbook
//! application: accounts, categorized expense and income records, transfers,
//! repeating budgets, and home-screen personalisation. Every table is kept in
//! local JSON files and reconciled with a per-user remote store by update
//! time.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, records, categories, budgets, etc.)
//! - `storage`: Local JSON table storage and the update-time ledger
//! - `remote`: Remote document stores
//! - `sync`: Local-first repositories and reconciliation
//! - `services`: Business logic layer
//! - `state`: Budget figures kept current across record changes
//! - `audit`: Audit logging system
//! - `cli` and `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use pocketbook::config::{PocketbookPaths, Settings};
//! use pocketbook::storage::LocalStore;
//! use pocketbook::sync::Repositories;
//!
//! let paths = PocketbookPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let store = LocalStore::new(paths)?;
//! store.load_all()?;
//! let repos = Repositories::from_settings(&store, &settings);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod remote;
pub mod services;
pub mod state;
pub mod storage;
pub mod sync;

pub use error::{PocketbookError, PocketbookResult};
