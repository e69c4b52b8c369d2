//! Tuning of a match: court geometry, speeds, scoring and the timings of the serve sequence.
//!
//! A [`SimulationConfig`] is fixed for the whole match. The values that ramp up during a rally live in
//! [`crate::game::Speeds`] and are reset to the base values of the config.

use std::fmt::{self, Display};
use std::time::Duration;

/// Duration of one physics step. Close to one display frame at 60 Hz.
pub const FIXED_TIMESTEP: Duration = Duration::from_micros(16_670);

/// Largest wall-clock gap a single frame may feed into the physics accumulator.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Largest angle, relative to the horizontal, a paddle can send the ball at.
pub const MAX_BOUNCE_ANGLE: f64 = std::f64::consts::FRAC_PI_4;

/// Game modes, fixing the number of paddles per side and whether the AI opponent plays.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Mode {
    /// One human on the left against the AI on the right.
    Solo,
    /// Two humans, one paddle each.
    Versus,
    /// Four humans, two paddles per side sharing the height of the court.
    Team,
}

impl Mode {
    /// Number of paddles on each side.
    pub fn paddles_per_side(self) -> usize {
        match self {
            Mode::Solo | Mode::Versus => 1,
            Mode::Team => 2,
        }
    }

    /// Whether the right side is played by the AI opponent.
    pub fn has_ai(self) -> bool {
        self == Mode::Solo
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Solo => "solo",
            Mode::Versus => "versus",
            Mode::Team => "team",
        })
    }
}

/// Errors found by [`SimulationConfig::validate`].
#[derive(thiserror::Error, Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub enum ConfigError {
    #[error("the court must have a positive size - got {0}x{1}")]
    InvalidCourt(f64, f64),

    #[error("paddles must have a positive size - got {0}x{1}")]
    InvalidPaddle(f64, f64),

    #[error("a paddle of height {paddle_height} doesn't fit in a lane of height {lane_height}")]
    PaddleTooTall { paddle_height: f64, lane_height: f64 },

    #[error("ball speeds must satisfy 0 < base ({base}) <= real ({real}) <= max ({max})")]
    SpeedOrdering { base: f64, real: f64, max: f64 },

    #[error("paddle speed must be positive - got {0}")]
    InvalidPaddleSpeed(f64),

    #[error("a match must be won with at least one point")]
    ZeroScoreToWin,

    #[error("the speed ramp interval must not be zero")]
    ZeroRampInterval,

    #[error("a countdown must start from at least 1")]
    ZeroCountdown,
}

/// Immutable parameters of a match. Distances are in pixels, speeds in pixels per fixed step.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub paddle_width: f64,
    pub paddle_height: f64,
    /// Distance from a side wall to the face of the paddle nearest to it.
    pub paddle_inset: f64,
    /// Extra reach of the paddle hit-boxes, and the gap kept between paddles and the walls.
    pub margin: f64,

    pub base_ball_speed: f64,
    /// Floor applied to the ball speed whenever a paddle returns it.
    pub real_ball_speed: f64,
    pub max_ball_speed: f64,
    pub base_paddle_speed: f64,

    pub score_to_win: u32,

    pub ramp_interval: Duration,
    pub ball_speed_step: f64,
    pub paddle_speed_step: f64,

    pub countdown_delay: Duration,
    pub countdown_step: Duration,
    pub countdown_from: u32,
    pub goal_delay: Duration,
    pub restart_delay: Duration,
    pub end_message_delay: Duration,
}

impl SimulationConfig {
    /// The tuning used by the one-paddle-per-side modes.
    pub fn duel() -> SimulationConfig {
        SimulationConfig {
            canvas_width: 800.0,
            canvas_height: 600.0,
            paddle_width: 10.0,
            paddle_height: 100.0,
            paddle_inset: 30.0,
            margin: 5.0,
            base_ball_speed: 4.5 * 1.5,
            real_ball_speed: 8.0 * 1.5,
            max_ball_speed: 12.0 * 1.5,
            base_paddle_speed: 8.5 * 1.5,
            score_to_win: 5,
            ramp_interval: Duration::from_millis(175),
            ball_speed_step: 0.1,
            paddle_speed_step: 0.05,
            countdown_delay: Duration::from_millis(1000),
            countdown_step: Duration::from_millis(1000),
            countdown_from: 3,
            goal_delay: Duration::from_millis(1500),
            restart_delay: Duration::from_millis(1500),
            end_message_delay: Duration::from_millis(1000),
        }
    }

    /// The tuning used by the two-paddles-per-side mode: shorter paddles and a slower ball.
    pub fn team() -> SimulationConfig {
        SimulationConfig {
            paddle_height: 78.0,
            base_ball_speed: 3.5 * 1.5,
            real_ball_speed: 4.0 * 1.5,
            max_ball_speed: 4.5 * 1.5,
            base_paddle_speed: 5.25 * 1.5,
            ramp_interval: Duration::from_millis(250),
            ..SimulationConfig::duel()
        }
    }

    pub fn for_mode(mode: Mode) -> SimulationConfig {
        match mode {
            Mode::Solo | Mode::Versus => SimulationConfig::duel(),
            Mode::Team => SimulationConfig::team(),
        }
    }

    /// Check the config can run a match with the given number of paddles per side.
    pub fn validate(&self, paddles_per_side: usize) -> Result<(), ConfigError> {
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(ConfigError::InvalidCourt(self.canvas_width, self.canvas_height));
        }
        if !(self.paddle_width > 0.0 && self.paddle_height > 0.0) {
            return Err(ConfigError::InvalidPaddle(self.paddle_width, self.paddle_height));
        }
        let lane_height = self.canvas_height / paddles_per_side.max(1) as f64 - self.margin;
        if self.paddle_height > lane_height {
            return Err(ConfigError::PaddleTooTall {
                paddle_height: self.paddle_height,
                lane_height,
            });
        }
        let (base, real, max) = (
            self.base_ball_speed,
            self.real_ball_speed,
            self.max_ball_speed,
        );
        if !(0.0 < base && base <= real && real <= max) {
            return Err(ConfigError::SpeedOrdering { base, real, max });
        }
        if !(self.base_paddle_speed > 0.0) {
            return Err(ConfigError::InvalidPaddleSpeed(self.base_paddle_speed));
        }
        if self.score_to_win == 0 {
            return Err(ConfigError::ZeroScoreToWin);
        }
        if self.ramp_interval.is_zero() {
            return Err(ConfigError::ZeroRampInterval);
        }
        if self.countdown_from == 0 {
            return Err(ConfigError::ZeroCountdown);
        }
        Ok(())
    }

    /// Lowest allowed y for the top edge of a paddle anywhere on the court.
    pub fn paddle_min_y(&self) -> f64 {
        self.margin
    }

    /// Highest allowed y for the top edge of a paddle anywhere on the court.
    pub fn paddle_max_y(&self) -> f64 {
        self.canvas_height - self.paddle_height - self.margin
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig::duel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for mode in [Mode::Solo, Mode::Versus, Mode::Team] {
            assert_eq!(
                SimulationConfig::for_mode(mode).validate(mode.paddles_per_side()),
                Ok(())
            );
        }
    }

    #[test]
    fn speed_ordering_is_enforced() {
        let config = SimulationConfig {
            real_ball_speed: 20.0,
            ..SimulationConfig::duel()
        };
        assert!(matches!(
            config.validate(1),
            Err(ConfigError::SpeedOrdering { .. })
        ));
    }

    #[test]
    fn paddles_must_fit_their_lane() {
        let config = SimulationConfig {
            paddle_height: 296.0,
            ..SimulationConfig::duel()
        };
        assert_eq!(config.validate(1), Ok(()));
        assert!(matches!(
            config.validate(2),
            Err(ConfigError::PaddleTooTall { .. })
        ));
    }

    #[test]
    fn zero_values_are_rejected() {
        let config = SimulationConfig {
            score_to_win: 0,
            ..SimulationConfig::duel()
        };
        assert_eq!(config.validate(1), Err(ConfigError::ZeroScoreToWin));

        let config = SimulationConfig {
            ramp_interval: Duration::ZERO,
            ..SimulationConfig::duel()
        };
        assert_eq!(config.validate(1), Err(ConfigError::ZeroRampInterval));
    }
}
