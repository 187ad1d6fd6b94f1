//! Core types and live aggregation for the EcoScale waste dashboard.

/// Reduction of record snapshots into daily and weekly totals.
pub mod aggregate;
/// Chart-ready series built from the totals.
pub mod chart;
/// Clocks and calendar boundaries.
pub mod clock;
/// Typed decoding of store documents.
pub mod decode;
/// Header date label.
pub mod label;
/// Domain models shared by sources and consumers.
pub mod model;
/// Traits describing record sources.
pub mod ports;
/// Live aggregator used by dashboards.
pub mod service;

pub use aggregate::*;
pub use chart::*;
pub use clock::*;
pub use decode::*;
pub use label::*;
pub use model::*;
pub use ports::*;
pub use service::*;
