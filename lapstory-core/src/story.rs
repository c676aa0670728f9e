//! Race story detection
//!
//! Walks an ordered lap sequence and evaluates every detection rule on each
//! adjacent pair `(prev, curr)`. Rules are independent, so one pair can
//! produce several highlights. Output order is pair order, then rule order
//! (overtake, tire cliff, pit timing, defensive battle); the ranker relies
//! on it for tie-breaks.

use crate::model::*;
use crate::ranker;
use crate::units::Seconds;

/// Sector compared by the overtake rule (1-based)
pub const OVERTAKE_SECTOR: usize = 2;

/// Lap time loss that turns worn tires into a tire cliff
pub const TIRE_CLIFF_LAP_DELTA: Seconds = Seconds(0.2);

/// Stress level above which a defensive battle is considered
pub const DEFENSIVE_STRESS: f64 = 80.0;

/// Pace delta above which a high-stress lap counts as defending
pub const DEFENSIVE_PACE_DELTA: Seconds = Seconds(0.1);

/// Full pipeline: detect, then rank and truncate
pub fn generate(frames: &[TelemetryFrame]) -> Vec<Highlight> {
    ranker::rank(detect(frames))
}

/// Every candidate highlight in detection order
///
/// Empty and single-lap sequences produce nothing. Callers are expected to
/// pass laps in strictly increasing order.
pub fn detect(frames: &[TelemetryFrame]) -> Vec<Highlight> {
    let mut highlights = Vec::new();

    for pair in frames.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        debug_assert!(prev.lap < curr.lap, "laps must be strictly increasing");

        highlights.extend(overtake(prev, curr));
        highlights.extend(tire_cliff(prev, curr));
        highlights.extend(pit_timing_shift(curr));
        highlights.extend(defensive_battle(curr));
    }

    tracing::debug!(
        laps = frames.len(),
        candidates = highlights.len(),
        "race story detection finished"
    );

    highlights
}

fn overtake(prev: &TelemetryFrame, curr: &TelemetryFrame) -> Option<Highlight> {
    if curr.position >= prev.position {
        return None;
    }
    // Frames missing sector 2 break the frame contract; skip rather than panic
    let delta = curr.sector(OVERTAKE_SECTOR)? - prev.sector(OVERTAKE_SECTOR)?;
    if !delta.is_gain() {
        return None;
    }

    Some(Highlight {
        lap: curr.lap,
        kind: HighlightKind::Overtake,
        description: format!(
            "Lap {}: up from P{} to P{}, {:.2}s quicker through sector {}",
            curr.lap,
            prev.position,
            curr.position,
            delta.abs().0,
            OVERTAKE_SECTOR
        ),
        evidence: Evidence {
            sector_delta: Some(SectorDelta {
                sector: OVERTAKE_SECTOR,
                delta,
            }),
            pace_change: Some(curr.pace_delta),
            ..Default::default()
        },
    })
}

fn tire_cliff(prev: &TelemetryFrame, curr: &TelemetryFrame) -> Option<Highlight> {
    if !curr.tire_condition.is_worn() {
        return None;
    }
    let lap_delta = curr.lap_time() - prev.lap_time();
    if lap_delta <= TIRE_CLIFF_LAP_DELTA {
        return None;
    }

    Some(Highlight {
        lap: curr.lap,
        kind: HighlightKind::TireCliff,
        description: format!(
            "Lap {}: tires at {:.0}% wear (threshold {:.0}%), lap time up {:.2}s",
            curr.lap,
            curr.tire_condition.wear_percentage.0,
            curr.tire_condition.worn_threshold.0,
            lap_delta.0
        ),
        evidence: Evidence {
            tire_condition: Some(curr.tire_condition),
            pace_change: Some(lap_delta),
            ..Default::default()
        },
    })
}

fn pit_timing_shift(curr: &TelemetryFrame) -> Option<Highlight> {
    if !curr.pitted_this_lap() {
        return None;
    }

    Some(Highlight {
        lap: curr.lap,
        kind: HighlightKind::PitTimingShift,
        description: format!(
            "Lap {}: {} pit stop",
            curr.lap, curr.pit_status.pit_type
        ),
        evidence: Evidence {
            pit_timing: Some(curr.pit_status),
            ..Default::default()
        },
    })
}

fn defensive_battle(curr: &TelemetryFrame) -> Option<Highlight> {
    if curr.stress_metric <= DEFENSIVE_STRESS || curr.pace_delta <= DEFENSIVE_PACE_DELTA {
        return None;
    }

    Some(Highlight {
        lap: curr.lap,
        kind: HighlightKind::DefensiveBattle,
        description: format!(
            "Lap {}: defending at stress {:.0}, pace off by {:.2}s",
            curr.lap, curr.stress_metric, curr.pace_delta.0
        ),
        evidence: Evidence {
            pace_change: Some(curr.pace_delta),
            ..Default::default()
        },
    })
}
