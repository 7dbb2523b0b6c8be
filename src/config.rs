//! Runtime configuration read from environment variables
//!
//! Accepts:
//!   BREAK_FUNDING_CURVE_BASE_RATE, BREAK_FUNDING_CURVE_STEP (decimals, e.g. 0.05)
//! Unset or unparseable values fall back to the defaults.

use std::env;

pub const CURVE_BASE_RATE_VAR: &str = "BREAK_FUNDING_CURVE_BASE_RATE";
pub const CURVE_STEP_VAR: &str = "BREAK_FUNDING_CURVE_STEP";

/// Default period-0 rate of the synthetic curve (5%)
pub const DEFAULT_CURVE_BASE_RATE: f64 = 0.05;

/// Default per-period bump of the synthetic curve (5bp)
pub const DEFAULT_CURVE_STEP: f64 = 0.0005;

/// Parameters of the synthetic discount curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveConfig {
    pub base_rate: f64,
    pub step: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            base_rate: DEFAULT_CURVE_BASE_RATE,
            step: DEFAULT_CURVE_STEP,
        }
    }
}

impl CurveConfig {
    /// Read the curve parameters from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the curve parameters through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: f64| -> f64 {
            match lookup(key) {
                Some(raw) => match raw.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => v,
                    _ => {
                        log::warn!("Ignoring {}={:?}, using default {}", key, raw, default);
                        default
                    }
                },
                None => default,
            }
        };

        Self {
            base_rate: read(CURVE_BASE_RATE_VAR, DEFAULT_CURVE_BASE_RATE),
            step: read(CURVE_STEP_VAR, DEFAULT_CURVE_STEP),
        }
    }
}
