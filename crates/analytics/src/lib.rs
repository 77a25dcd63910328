//! # Screener Analytics Engine
//!
//! This crate turns daily price history into the per-ticker risk/return
//! statistics the ranking layer consumes.
//!
//! ## Architectural Principles
//!
//! - **Pure logic crate:** no I/O. Prices come in as a `PriceTable`, metrics go
//!   out as a `MetricTable`.
//! - **Stateless calculation:** the `MetricsEngine` holds only its settings, so
//!   the same table always yields the same metrics.
//! - **Undefined is not zero:** a ratio that cannot be computed is `None`, and a
//!   drawdown that never recovers is `RecoveryDays::Unrecovered`.
//!
//! ## Public API
//!
//! - `MetricsEngine`: windowing, coverage filtering and per-ticker statistics.
//! - `returns`: return series derivation and date alignment.
//! - `drawdown`: running peak, drawdown curve, maximum drawdown and recovery days.
//! - `MetricRecord` / `MetricTable`: the engine's output.
//! - `AnalyticsError`: the errors that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod drawdown;
pub mod engine;
pub mod error;
pub mod report;
pub mod returns;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use drawdown::DrawdownAnalysis;
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use report::{MetricRecord, MetricRow, MetricTable};
