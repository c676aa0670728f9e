//! Lap telemetry and highlight data model
//!
//! One `TelemetryFrame` describes a single completed lap. Frames are the
//! unit of the live stream, of the telemetry window and of the race story
//! analysis. `Highlight`s are produced fresh by every analysis run and are
//! never mutated afterwards.
//!
//! Wire names are camelCase to match the stream producers.

use crate::error::FrameError;
use crate::units::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Telemetry record for one lap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryFrame {
    /// Lap number (1-based, strictly increasing within a sequence)
    pub lap: u32,

    /// One time per sector, in track order
    pub sector_times: Vec<Seconds>,

    pub tire_condition: TireCondition,

    #[serde(default)]
    pub pit_status: PitStatus,

    /// Signed pace delta against the prior lap or the car ahead
    pub pace_delta: Seconds,

    /// Race position (1 = leading)
    pub position: u32,

    /// Non-negative driver load proxy (g-force / physiological)
    pub stress_metric: f64,
}

/// Tire wear state at the end of a lap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TireCondition {
    pub wear_percentage: Percent,
    /// Wear above this value counts as worn
    pub worn_threshold: Percent,
}

impl TireCondition {
    pub fn is_worn(&self) -> bool {
        self.wear_percentage > self.worn_threshold
    }
}

/// Pit stop information carried by a lap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitStatus {
    pub pit_lap: Option<u32>,
    pub pit_type: PitType,
}

/// Pit stop strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitType {
    Undercut,
    Overcut,
    Standard,
    #[default]
    None,
}

impl fmt::Display for PitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PitType::Undercut => "undercut",
            PitType::Overcut => "overcut",
            PitType::Standard => "standard",
            PitType::None => "none",
        };
        f.write_str(s)
    }
}

impl TelemetryFrame {
    /// Total lap time (sum of all sector times)
    pub fn lap_time(&self) -> Seconds {
        self.sector_times.iter().sum()
    }

    /// Time for a 1-based sector number
    pub fn sector(&self, number: usize) -> Option<Seconds> {
        number
            .checked_sub(1)
            .and_then(|idx| self.sector_times.get(idx))
            .copied()
    }

    /// Whether this lap is the one the car pitted on
    pub fn pitted_this_lap(&self) -> bool {
        self.pit_status.pit_lap == Some(self.lap)
    }

    /// Check the frame against the contract the analysis relies on
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.lap == 0 {
            return Err(FrameError::InvalidLap);
        }
        if self.sector_times.len() < 2 {
            return Err(FrameError::TooFewSectors {
                lap: self.lap,
                count: self.sector_times.len(),
            });
        }
        if self.position == 0 {
            return Err(FrameError::InvalidPosition { lap: self.lap });
        }
        if !self.tire_condition.wear_percentage.is_valid()
            || !self.tire_condition.worn_threshold.is_valid()
        {
            return Err(FrameError::WearOutOfRange { lap: self.lap });
        }
        if self.stress_metric.is_nan() || self.stress_metric < 0.0 {
            return Err(FrameError::NegativeStress {
                lap: self.lap,
                value: self.stress_metric,
            });
        }
        Ok(())
    }
}

// === Highlights ===

/// Race story event classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightKind {
    Overtake,
    DefensiveBattle,
    TireCliff,
    PitTimingShift,
    /// Reserved; no detection rule produces it yet
    StressPeak,
}

impl fmt::Display for HighlightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HighlightKind::Overtake => "Overtake",
            HighlightKind::DefensiveBattle => "DefensiveBattle",
            HighlightKind::TireCliff => "TireCliff",
            HighlightKind::PitTimingShift => "PitTimingShift",
            HighlightKind::StressPeak => "StressPeak",
        };
        f.write_str(s)
    }
}

/// Time difference in one sector between two consecutive laps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorDelta {
    /// 1-based sector number
    pub sector: usize,
    /// Negative = faster than the previous lap
    pub delta: Seconds,
}

/// Telemetry values backing a highlight
///
/// Only the fields relevant to the detection rule are populated; the rest
/// stay `None` and are left out of the JSON output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_delta: Option<SectorDelta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tire_condition: Option<TireCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace_change: Option<Seconds>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pit_timing: Option<PitStatus>,
}

/// A single detected race event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub lap: u32,
    #[serde(rename = "type")]
    pub kind: HighlightKind,
    pub description: String,
    pub evidence: Evidence,
}

impl Highlight {
    /// Ranking magnitude: |paceChange|, or 0 when there is none
    pub fn pace_magnitude(&self) -> f64 {
        self.evidence.pace_change.map(|p| p.0.abs()).unwrap_or(0.0)
    }
}
