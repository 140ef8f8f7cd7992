// =============================================================================
// Indicator Engine
// =============================================================================
//
// Pure, side-effect-free computations over a single price series. Every
// function is reentrant and holds no state between calls; degenerate input
// comes back as `None` entries or an `EngineError`, never as a panic.

pub mod analysis;
pub mod context;
pub mod error;
pub mod rsi;
pub mod snapshot;

pub use analysis::{analyze, AnalysisReport};
pub use context::{build_advisory_context, AdvisoryContext};
pub use error::EngineError;
pub use rsi::{compute_rsi, latest_rsi, RsiZone, DEFAULT_RSI_PERIOD};
pub use snapshot::{compute_snapshot, SnapshotMetrics};
