// =============================================================================
// Engine Errors
// =============================================================================
//
// Expected edge cases of the indicator pipeline come back as values of this
// enum; nothing in `indicators` panics on degenerate market data. The display
// layer decides how each kind is worded for the user.
// =============================================================================

use serde::Serialize;
use thiserror::Error;

/// Typed failure of an indicator computation.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineError {
    /// Fewer bars than the computation needs.
    #[error("insufficient data: need at least {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// The reference price for a relative change is zero.
    #[error("division by zero: {what} is zero")]
    DivisionByZero { what: &'static str },

    /// Timestamps are not strictly ascending at `index`.
    #[error("price series is not strictly ascending at index {index}")]
    UnorderedSeries { index: usize },

    /// A bar carries a NaN or infinite price/volume.
    #[error("bar {index} contains a non-finite value")]
    InvalidBar { index: usize },
}
