// =============================================================================
// Relative Strength Index (RSI) — Simple Rolling Average
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split each delta into a gain (max(delta, 0)) and a loss
//          (max(-delta, 0)).
// Step 3 — Average the last `period` gains and losses with a plain trailing
//          mean (no Wilder smoothing).
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The output is index-aligned with the closes. Index 0 has no delta and
// indices below `period` have no full window, so they are `None`.
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use serde::Serialize;

/// Look-back used by the dashboard when no period is configured.
pub const DEFAULT_RSI_PERIOD: usize = 14;

const OVERBOUGHT: f64 = 70.0;
const OVERSOLD: f64 = 30.0;

/// Compute the RSI series for `closes` over a trailing window of `period`.
///
/// The returned vector always has `closes.len()` entries. Entry `i` is
/// `Some` only when `i >= period`, i.e. when `period` deltas end at `i`.
///
/// # Edge cases
/// - `period == 0` or `closes.len() <= period` => all `None`.
/// - Average loss zero, average gain positive => 100.0.
/// - Both averages zero (flat window) => 50.0.
/// - A window touching a non-finite close => `None` for that entry.
///
/// Each window is summed from scratch, so a value depends only on the closes
/// inside its window and is bit-for-bit reproducible.
pub fn compute_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return result;
    }

    // --- Gains and losses per delta ------------------------------------------
    // deltas[j] is the change from closes[j] to closes[j + 1].
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            if !delta.is_finite() {
                // f64::max would quietly turn NaN into 0.0.
                return (f64::NAN, f64::NAN);
            }
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let period_f = period as f64;

    // --- Trailing windows ----------------------------------------------------
    for (j, (g, l)) in gains.windows(period).zip(losses.windows(period)).enumerate() {
        let avg_gain = g.iter().sum::<f64>() / period_f;
        let avg_loss = l.iter().sum::<f64>() / period_f;
        // Window over deltas[j..j + period] ends at close index j + period.
        result[j + period] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

/// Most recent value of an RSI series, if defined.
pub fn latest_rsi(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

/// Overbought / oversold classification of a single RSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiZone {
    Overbought,
    Neutral,
    Oversold,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi >= OVERBOUGHT {
            Self::Overbought
        } else if rsi <= OVERSOLD {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Oversold => write!(f, "OVERSOLD"),
        }
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` for non-finite averages, i.e. a window with a bad close.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // Flat window — neutral.
    } else if avg_loss == 0.0 {
        100.0 // All gains, no losses.
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi.clamp(0.0, 100.0))
    } else {
        None
    }
}
