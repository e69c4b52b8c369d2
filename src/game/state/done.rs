use std::time::Duration;

use crate::config::Mode;
use crate::game::Side;

/// Result of a completed match, handed to whoever records match history.
#[derive(Clone, Debug, PartialEq)]
pub struct GameResult {
    pub mode: Mode,
    pub score: [u32; 2],
    pub winner: Side,
    /// Time between the start of the match and the winning point, as seen by the frame timestamps.
    pub duration: Duration,
}

impl GameResult {
    pub(in crate::game) fn new(mode: Mode, score: [u32; 2], winner: Side, duration: Duration) -> Self {
        Self {
            mode,
            score,
            winner,
            duration,
        }
    }
}
