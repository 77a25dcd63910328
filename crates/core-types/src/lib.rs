//! # Screener Core Types
//!
//! The value objects shared by every layer of the screener: validated price
//! series, the ticker-keyed price table, and the closed set of metrics the
//! analytics and ranking crates agree on.
//!
//! Nothing in this crate performs I/O or holds cross-run state.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Metric, RecoveryDays};
pub use error::CoreError;
pub use structs::{PricePoint, PriceSeries, PriceTable};
