//! Telemetry frame contract errors

use thiserror::Error;

/// Reasons a frame is refused by validation or by the telemetry window
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("lap number must be at least 1")]
    InvalidLap,

    #[error("lap {lap} has {count} sector time(s), at least 2 are required")]
    TooFewSectors { lap: u32, count: usize },

    #[error("lap {lap} has position 0, positions start at 1")]
    InvalidPosition { lap: u32 },

    #[error("lap {lap} has tire wear outside 0-100")]
    WearOutOfRange { lap: u32 },

    #[error("lap {lap} has negative stress metric {value}")]
    NegativeStress { lap: u32, value: f64 },

    #[error("lap {lap} arrived after lap {newest}")]
    OutOfOrder { lap: u32, newest: u32 },
}
