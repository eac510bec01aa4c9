pub mod camera;
pub mod lidar;

pub use camera::*;
pub use lidar::*;

use serde::{Deserialize, Serialize};

/// Outcome of a time-to-collision estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Ttc {
    /// Closing motion was measured. `clamped` is set when the raw value
    /// exceeded the ceiling and `seconds` holds the ceiling.
    Measured { seconds: f64, clamped: bool },
    /// Valid measurement without closing motion.
    NotClosing,
    /// Too few stable feature pairs or no qualifying lidar cluster.
    InsufficientData,
}

impl Ttc {
    pub fn clamped(raw_seconds: f64, ceiling: f64) -> Ttc {
        if raw_seconds > ceiling {
            Ttc::Measured {
                seconds: ceiling,
                clamped: true,
            }
        } else {
            Ttc::Measured {
                seconds: raw_seconds,
                clamped: false,
            }
        }
    }

    pub fn seconds(&self) -> Option<f64> {
        match self {
            Ttc::Measured { seconds, .. } => Some(*seconds),
            _ => None,
        }
    }

    /// Single-value form where every unmeasured outcome reads as `ceiling`.
    pub fn or_ceiling(&self, ceiling: f64) -> f64 {
        self.seconds().unwrap_or(ceiling)
    }
}

impl std::fmt::Display for Ttc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ttc::Measured {
                seconds,
                clamped: false,
            } => write!(f, "{:.2} s", seconds),
            Ttc::Measured {
                seconds,
                clamped: true,
            } => write!(f, ">{:.2} s", seconds),
            Ttc::NotClosing => write!(f, "not closing"),
            Ttc::InsufficientData => write!(f, "n/a"),
        }
    }
}
