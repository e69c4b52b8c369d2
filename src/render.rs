//! Read-only snapshot of a game handed to whatever draws it, once per display frame.

use std::time::Duration;

use crate::game::{Phase, Point, Rect, Side};

/// Speeds of the current rally, for display and debugging.
#[derive(Clone, Debug, PartialEq)]
pub struct Telemetry {
    /// Actual speed of the ball, zero while it is held still.
    pub ball_speed: f64,
    /// Speed the ball is normalized to on its next bounce.
    pub configured_ball_speed: f64,
    pub paddle_speed: f64,
    /// Simulated playing time since the last serve.
    pub playing_time: Duration,
}

/// Everything needed to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub ball: Point,
    /// Drawn rectangles of the paddles, per side, from top to bottom.
    pub paddles: [Vec<Rect>; 2],
    pub score: [u32; 2],
    pub phase: Phase,
    pub paused: bool,
    pub countdown_text: Option<String>,
    pub end_message: Option<String>,
    pub telemetry: Telemetry,
    /// Physics steps run while producing this frame.
    pub steps: u32,
}

impl Frame {
    pub fn paddles(&self, side: Side) -> &[Rect] {
        &self.paddles[side.index()]
    }

    pub fn score_of(&self, side: Side) -> u32 {
        self.score[side.index()]
    }

    /// One-line summary, as printed by the headless driver.
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "{} - {} | {:?}{} | ball ({:.0}, {:.0}) at {:.2} px/step",
            self.score[0],
            self.score[1],
            self.phase,
            if self.paused { " (paused)" } else { "" },
            self.ball.x,
            self.ball.y,
            self.telemetry.ball_speed,
        );
        if let Some(text) = self.end_message.as_ref().or(self.countdown_text.as_ref()) {
            line.push_str(" | ");
            line.push_str(text);
        }
        line
    }
}
