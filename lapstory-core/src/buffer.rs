//! Bounded telemetry window
//!
//! Holds the most recent laps in arrival order. When capacity is exceeded the
//! oldest lap is evicted (FIFO). The window is what live displays read and
//! what the race story analysis runs over.

use crate::error::FrameError;
use crate::model::{Highlight, TelemetryFrame};
use crate::story;
use std::collections::VecDeque;

/// Default number of laps retained
pub const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone)]
pub struct TelemetryBuffer {
    frames: VecDeque<TelemetryFrame>,
    capacity: usize,
}

impl TelemetryBuffer {
    /// Create a window holding at most `capacity` laps (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a lap, evicting the oldest one if the window is full
    ///
    /// A frame for the newest lap replaces it (late correction). Older laps
    /// are refused so the window stays strictly ordered. Returns the evicted
    /// frame, if any.
    pub fn push(&mut self, frame: TelemetryFrame) -> Result<Option<TelemetryFrame>, FrameError> {
        frame.validate()?;

        if let Some(newest) = self.frames.back_mut() {
            if frame.lap == newest.lap {
                tracing::debug!(lap = frame.lap, "replacing telemetry for newest lap");
                *newest = frame;
                return Ok(None);
            }
            if frame.lap < newest.lap {
                return Err(FrameError::OutOfOrder {
                    lap: frame.lap,
                    newest: newest.lap,
                });
            }
        }

        let evicted = if self.frames.len() == self.capacity {
            self.frames.pop_front()
        } else {
            None
        };
        self.frames.push_back(frame);
        Ok(evicted)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&TelemetryFrame> {
        self.frames.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetryFrame> {
        self.frames.iter()
    }

    /// Copy of the window, oldest lap first
    pub fn snapshot(&self) -> Vec<TelemetryFrame> {
        self.frames.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Run the race story pipeline over the current window
    pub fn analyze(&self) -> Vec<Highlight> {
        match self.frames.as_slices() {
            (front, []) => story::generate(front),
            _ => story::generate(&self.snapshot()),
        }
    }
}

impl Default for TelemetryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
