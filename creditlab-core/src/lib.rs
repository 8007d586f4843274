//! CreditLab Core: domain types and the analytics/execution components.
//!
//! This crate contains the credit-spread research pipeline:
//! - Domain types (fills, positions, portfolio snapshots, run identifiers)
//! - Date-indexed time-series tables, canonicalization and polars interop
//! - Signal construction from rolling z-scores of credit and term spreads
//! - Exposure and limit checks for rates/credit positions
//! - Adaptive TWAP execution against a simulated venue
//! - Execution / market PnL attribution of fills
//! - Scenario stress testing of portfolio snapshots
//!
//! All components are pure over their inputs. Randomness enters only through
//! seeded models derived from [`rng::SeedHierarchy`], and time only through an
//! injectable [`execution::Clock`].

pub mod attribution;
pub mod config;
pub mod data;
pub mod domain;
pub mod execution;
pub mod risk;
pub mod rng;
pub mod signal;
pub mod stress;

pub use config::ConfigError;
pub use data::{SchemaError, TimeSeriesTable};
pub use execution::ExecutionError;
