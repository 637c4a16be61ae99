//! RegenAgri - DePIN sensor ledger dashboard
//!
//! Records simulated soil sensor readings in an EVM key/value contract and
//! lets the owning wallet verify or reject them.
//!
//! ## Module Structure
//!
//! - `config` - Network table, environment overrides, provider construction
//! - `user_settings` - Settings persisted between sessions
//! - `contract` - Key/value store trait with contract and in-memory backends
//! - `record` - Sensor record model and its stored JSON layout
//! - `registry` - Loading, submitting and reviewing records through a store
//! - `mock_fhe` - Reversible placeholder value encoding (not cryptography)
//! - `stats` - Dashboard counters, score and list filters
//! - `wallet` - Connected signer (local key or Ledger) and decrypt authorization
//! - `export` - CSV export of loaded records
//! - `operation_log` - Plain-text log of user-requested operations
//! - `utils` - Formatting and error message helpers
//! - `gui` - egui/eframe dashboard

pub mod config;
pub mod contract;
pub mod export;
pub mod gui;
pub mod mock_fhe;
pub mod operation_log;
pub mod record;
pub mod registry;
pub mod stats;
pub mod user_settings;
pub mod utils;
pub mod wallet;
