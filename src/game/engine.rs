//! Implementation of the randomness and collisions needed to run a Pong game.

use std::f64::consts::PI;
use std::time::Duration;

use rand::distributions::{Distribution, Uniform, WeightedIndex};

use crate::config::{SimulationConfig, MAX_BOUNCE_ANGLE};

use super::entities::{Ball, Court, Paddle};
use super::Side;
use sweep::{sweep_into_rect, Point};

pub mod sweep;

/// Serve angles, in radians, that are neither too close to the vertical nor to the horizontal. Angles are measured
/// with the y axis pointing down the court.
const PLAYABLE_SERVICE_RANGES: [(f64, f64); 4] = [
    (0.4, 1.0),
    (2.1, PI - 0.4),
    (PI + 0.4, 4.4),
    (5.1, 2.0 * PI - 0.4),
];

/// Preemptively optimized structure containing distributions needed to generate random service angles.
#[derive(Clone, Debug)]
pub struct ServiceGenerator {
    range_choice: WeightedIndex<f64>,
    ranges: [Uniform<f64>; 4],
}

impl ServiceGenerator {
    /// Create a new [`ServiceGenerator`] using preemptive calculating constructors of [`Distribution`]s.
    pub fn new() -> ServiceGenerator {
        let weights = PLAYABLE_SERVICE_RANGES.map(|(low, high)| high - low);
        ServiceGenerator {
            // The weights are hardcoded positive numbers.
            range_choice: WeightedIndex::new(weights).expect("invalid service ranges"),
            ranges: PLAYABLE_SERVICE_RANGES.map(|(low, high)| Uniform::new(low, high)),
        }
    }

    /// Generates a service angle, uniformly distributed over the playable ranges.
    pub fn gen_angle<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.ranges[self.range_choice.sample(rng)].sample(rng)
    }

    /// Whether a serve along the given angle makes for a playable rally.
    pub fn is_playable(angle: f64) -> bool {
        PLAYABLE_SERVICE_RANGES
            .iter()
            .any(|&(low, high)| low <= angle && angle <= high)
    }
}

impl Default for ServiceGenerator {
    fn default() -> Self {
        ServiceGenerator::new()
    }
}

/// Current values of the speeds ramping up during a rally.
#[derive(Clone, Debug, PartialEq)]
pub struct Speeds {
    pub ball: f64,
    pub paddle: f64,
    since_ramp: Duration,
}

impl Speeds {
    pub fn base(config: &SimulationConfig) -> Speeds {
        Speeds {
            ball: config.base_ball_speed,
            paddle: config.base_paddle_speed,
            since_ramp: Duration::ZERO,
        }
    }

    /// Account for one step of play, speeding things up each time a ramp interval has elapsed.
    pub fn ramp(&mut self, step: Duration, config: &SimulationConfig) {
        self.since_ramp += step;
        if self.since_ramp >= config.ramp_interval && self.ball < config.max_ball_speed {
            self.ball = f64::min(self.ball + config.ball_speed_step, config.max_ball_speed);
            self.paddle += config.paddle_speed_step;
            self.since_ramp = Duration::ZERO;
        }
    }

    /// Restart the ramp interval, keeping the current speeds.
    pub fn restart_ramp(&mut self) {
        self.since_ramp = Duration::ZERO;
    }

    /// Make sure a returned ball leaves at least at the real speed.
    fn apply_floor(&mut self, config: &SimulationConfig) {
        if self.ball < config.real_ball_speed {
            self.ball = config.real_ball_speed;
        }
    }
}

/// What happened to the ball during one step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Moved,
    WallBounce,
    /// The ball was returned by the paddle at this index, counted from the top, of the given side.
    PaddleHit { side: Side, paddle: usize },
    /// The ball left the court. `scorer` is the side whose wall was not crossed.
    Goal { scorer: Side },
}

/// Move the ball by one step, resolving collisions along the way.
///
/// Only the paddles of the side the ball is heading to are tested. A goal is detected before the walls are.
pub fn resolve_step(
    ball: &mut Ball,
    court: &Court,
    speeds: &mut Speeds,
    config: &SimulationConfig,
) -> StepOutcome {
    let start = Point::new(ball.x, ball.y);
    let end = Point::new(ball.x + ball.dx, ball.y + ball.dy);

    if let Some(side) = Side::facing(ball.dx) {
        for (index, paddle) in court.paddles(side).iter().enumerate() {
            let hitbox = Court::hitbox(side, paddle, config);
            if let Some(hit) = sweep_into_rect(start, end, &hitbox) {
                (ball.x, ball.y) = (hit.x, hit.y);
                bounce_off_paddle(ball, side, paddle, speeds, config);
                log::debug!(
                    "Ball returned by the {side} paddle {index} at ({:.1}, {:.1}).",
                    ball.x,
                    ball.y
                );
                return StepOutcome::PaddleHit {
                    side,
                    paddle: index,
                };
            }
        }
    }

    (ball.x, ball.y) = (end.x, end.y);
    if let Some(out_side) = side_of_ball_exit(ball.x, config) {
        return StepOutcome::Goal { scorer: !out_side };
    }
    if bounce_off_horizontal_edges(ball, speeds.ball, config) {
        StepOutcome::WallBounce
    } else {
        StepOutcome::Moved
    }
}

/// Computes whether the ball left the court through one of the side walls.
/// * If so, returns the [`Side`] of the wall crossed.
/// * If not, returns [`None`].
pub fn side_of_ball_exit(ball_x: f64, config: &SimulationConfig) -> Option<Side> {
    if ball_x < 0.0 {
        Some(Side::Left)
    } else if ball_x > config.canvas_width {
        Some(Side::Right)
    } else {
        None
    }
}

/// Computes collisions of the ball with the top and bottom walls. On contact, the vertical velocity is turned away
/// from the wall, the ball is pushed just off it and its speed is set to `speed`. Returns whether a bounce occurred.
///
/// The AI replays this same rule when predicting trajectories.
pub fn bounce_off_horizontal_edges(ball: &mut Ball, speed: f64, config: &SimulationConfig) -> bool {
    let (top, bottom) = (config.margin, config.canvas_height - config.margin);
    if ball.y <= top {
        ball.y = top + 1.0;
        ball.dy = ball.dy.abs();
    } else if ball.y >= bottom {
        ball.y = bottom - 1.0;
        ball.dy = -ball.dy.abs();
    } else {
        return false;
    }
    ball.rebounds += 1;
    ball.normalize_speed(speed);
    true
}

/// Send the ball back from a paddle of the given side, with an angle depending on where it hit the paddle: the
/// center sends it straight, the edges up to [`MAX_BOUNCE_ANGLE`].
fn bounce_off_paddle(
    ball: &mut Ball,
    side: Side,
    paddle: &Paddle,
    speeds: &mut Speeds,
    config: &SimulationConfig,
) {
    speeds.apply_floor(config);
    let relative_impact = f64::clamp((ball.y - paddle.y) / config.paddle_height, 0.0, 1.0);
    let angle = (relative_impact - 0.5) * 2.0 * MAX_BOUNCE_ANGLE;
    ball.dx = -side.direction() * speeds.ball * f64::cos(angle);
    ball.dy = speeds.ball * f64::sin(angle);
    ball.normalize_speed(speeds.ball);
    ball.rebounds = 0;
}

/// Velocity of a ball served along the given angle.
pub fn service_velocity(angle: f64, speed: f64) -> (f64, f64) {
    (speed * f64::cos(angle), speed * f64::sin(angle))
}
