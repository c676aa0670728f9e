//! Deterministic highlight renderings
//!
//! Turns highlights into English sentences for commentary feeds and into
//! broadcast cards for on-screen graphics. Pure functions, no randomness.

use crate::model::*;
use crate::units::Seconds;
use serde::{Deserialize, Serialize};

/// Structured on-screen card for one highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastCard {
    pub title: String,
    pub main_text: String,
    pub evidence: Evidence,
}

/// "gain" for negative deltas (faster), "loss" otherwise
fn direction(delta: Seconds) -> &'static str {
    if delta.is_gain() {
        "gain"
    } else {
        "loss"
    }
}

/// Absolute value to two decimals plus its direction, e.g. "0.50s gain"
fn qualified(delta: Seconds) -> String {
    format!("{:.2}s {}", delta.abs().0, direction(delta))
}

/// One sentence for a highlight, chosen by its type
pub fn to_english_summary(highlight: &Highlight) -> String {
    let lap = highlight.lap;
    let evidence = &highlight.evidence;

    match highlight.kind {
        HighlightKind::Overtake => match evidence.sector_delta {
            Some(sd) => format!(
                "Lap {}: overtake completed with a {} in sector {}.",
                lap,
                qualified(sd.delta),
                sd.sector
            ),
            None => format!("Lap {}: overtake completed.", lap),
        },
        HighlightKind::TireCliff => {
            let wear = evidence
                .tire_condition
                .map(|t| format!(" at {:.0}% wear", t.wear_percentage.0))
                .unwrap_or_default();
            match evidence.pace_change {
                Some(pace) => format!(
                    "Lap {}: tires fell off a cliff{}, a {} in lap time.",
                    lap,
                    wear,
                    qualified(pace)
                ),
                None => format!("Lap {}: tires fell off a cliff{}.", lap, wear),
            }
        }
        HighlightKind::PitTimingShift => match evidence.pit_timing {
            Some(pit) if pit.pit_type != PitType::None => format!(
                "Lap {}: {} pit stop shifts the strategy.",
                lap, pit.pit_type
            ),
            _ => format!("Lap {}: pit stop shifts the strategy.", lap),
        },
        HighlightKind::DefensiveBattle => match evidence.pace_change {
            Some(pace) => format!(
                "Lap {}: defensive battle under pressure, a {} in pace.",
                lap,
                qualified(pace)
            ),
            None => format!("Lap {}: defensive battle under pressure.", lap),
        },
        HighlightKind::StressPeak => match evidence.pace_change {
            Some(pace) => format!(
                "Lap {}: driver stress peaks with a {} in pace.",
                lap,
                qualified(pace)
            ),
            None => format!("Lap {}: driver stress peaks.", lap),
        },
    }
}

/// Summaries for a list of highlights, same length and order
pub fn to_english_summaries(highlights: &[Highlight]) -> Vec<String> {
    highlights.iter().map(to_english_summary).collect()
}

pub fn to_broadcast_card(highlight: &Highlight) -> BroadcastCard {
    BroadcastCard {
        title: format!("{} on Lap {}", highlight.kind, highlight.lap),
        main_text: highlight.description.clone(),
        evidence: highlight.evidence.clone(),
    }
}

pub fn to_broadcast_cards(highlights: &[Highlight]) -> Vec<BroadcastCard> {
    highlights.iter().map(to_broadcast_card).collect()
}
