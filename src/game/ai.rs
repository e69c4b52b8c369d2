//! The computer opponent of solo matches.
//!
//! On every return of the human, the AI predicts where the ball will reach its paddle, plans when to move, and
//! sometimes decides on purpose to aim just beside the ball. It then steers its paddle in up to three stages: a wait,
//! a coarse approach and a fine adjustment, whose timings depend on the wall rebounds of the predicted trajectory.

use rand::Rng;

use crate::config::SimulationConfig;

use super::engine::Speeds;
use super::entities::{Ball, Court, Paddle};
use super::state::Score;
use super::Side;
pub use predict::{BounceShape, Prediction};
use steer::{Aim, Overshoot, Steer, Steering};

pub mod predict;
mod steer;

const SERVE_TOLERANCE: f64 = 15.0;
const DIRECT_COARSE_TOLERANCE: f64 = 80.0;
const BOUNCING_COARSE_TOLERANCE: f64 = 200.0;
const FINE_TOLERANCE: f64 = 10.0;
const FAST_FINE_TOLERANCE: f64 = 5.0;
/// Ball speed above which the fine adjustment uses [`FAST_FINE_TOLERANCE`].
const FAST_BALL_SPEED: f64 = 11.0;
/// Distance to the target under which the fine adjustment never overshoots.
const FINE_OVERSHOOT_CUTOFF: f64 = 30.0;

/// Largest distance between the paddle center and the point the AI aims with.
const MAX_PADDLE_OFFSET: f64 = 38.0;
/// Distance from the paddle center to the aimed point when missing on purpose, just beyond the hit-box.
const MISS_OFFSET: f64 = 80.0;
/// Returns the AI must have made in a rally before it may miss on purpose.
const MIN_SHOTS_BEFORE_MISS: u32 = 4;

/// Chance of missing on purpose for a number of returns made by the AI in the rally and its lead in points.
pub fn miss_chance(shots: u32, lead: i64) -> f64 {
    if shots < MIN_SHOTS_BEFORE_MISS {
        return 0.0;
    }
    let base = if shots < 9 {
        0.15
    } else if shots < 12 {
        0.25
    } else {
        0.35
    };
    let bonus = if lead >= 4 {
        0.30
    } else if lead >= 3 {
        0.20
    } else if lead >= 2 {
        0.15
    } else {
        0.0
    };
    base + bonus
}

/// What the AI is busy with.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum AiMode {
    /// Waiting for the ball to head its way.
    Idle,
    /// Placing the paddle in front of a serve.
    ServeTracking,
    /// Answering a return of the human.
    Exchange,
}

/// Durations, in steps, of the stages of an exchange.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Plan {
    pub depart: f64,
    pub coarse: f64,
    pub fine: f64,
}

impl Plan {
    fn draw<R: Rng + ?Sized>(ticks: f64, rng: &mut R) -> Plan {
        let depart = rng.gen_range(0.10..0.20);
        let fine = rng.gen_range(0.10..0.25);
        Plan {
            depart: depart * ticks,
            coarse: (1.0 - depart - fine) * ticks,
            fine: fine * ticks,
        }
    }
}

/// Everything the AI remembers about the current exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct AiState {
    pub mode: AiMode,
    pub prediction: Option<Prediction>,
    pub plan: Plan,
    /// Offset from the paddle center of the point aimed with, drawn for each exchange.
    pub delta_paddle: f64,
    /// Extra offset making the paddle miss, zero unless the AI decided to lose this exchange.
    pub delta_error: f64,
    /// Whether the coarse approach may overshoot.
    pub coarse_overshoot: bool,
    /// Whether the fine adjustment may overshoot.
    pub fine_overshoot: bool,
    pub entered_fine: bool,
    /// Steps since the exchange started.
    pub elapsed: u32,
}

impl Default for AiState {
    fn default() -> Self {
        AiState {
            mode: AiMode::Idle,
            prediction: None,
            plan: Plan::default(),
            delta_paddle: 0.0,
            delta_error: 0.0,
            coarse_overshoot: false,
            fine_overshoot: false,
            entered_fine: false,
            elapsed: 0,
        }
    }
}

/// The AI steering the first paddle of one side.
#[derive(Clone, Debug)]
pub struct AiOpponent {
    side: Side,
    state: AiState,
    steering: Steering,
}

impl AiOpponent {
    pub fn new(side: Side) -> AiOpponent {
        AiOpponent {
            side,
            state: AiState::default(),
            steering: Steering::default(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn state(&self) -> &AiState {
        &self.state
    }

    /// Forget everything about the current exchange and wait for the next serve.
    pub fn reset(&mut self) {
        self.state = AiState::default();
        self.steering.rearm();
    }

    /// The ball was just served: track it if it heads to the AI.
    pub fn on_serve(&mut self, ball: &Ball, speeds: &Speeds, config: &SimulationConfig) {
        self.reset();
        self.state.prediction = predict::predict(ball, self.side, speeds.ball, config);
        if let Some(prediction) = &self.state.prediction {
            log::trace!("AI tracks the serve toward y = {:.1}.", prediction.y);
            self.state.mode = AiMode::ServeTracking;
        }
    }

    /// A paddle of `hit_side` just returned the ball, which already carries its new velocity.
    #[allow(clippy::too_many_arguments)]
    pub fn on_paddle_hit<R: Rng + ?Sized>(
        &mut self,
        hit_side: Side,
        ball: &Ball,
        court: &Court,
        score: &Score,
        speeds: &Speeds,
        rng: &mut R,
        config: &SimulationConfig,
    ) {
        self.reset();
        if hit_side == self.side {
            return;
        }
        let Some(prediction) = predict::predict(ball, self.side, speeds.ball, config) else {
            return;
        };

        let magnitude = rng.gen_range(0.0..MAX_PADDLE_OFFSET);
        self.state.delta_paddle = if rng.gen() { magnitude } else { -magnitude };
        self.state.coarse_overshoot = rng.gen();
        self.state.fine_overshoot = rng.gen();

        let chance = miss_chance(court.shots(self.side), score.lead(self.side));
        if chance > 0.0 && rng.gen::<f64>() < chance {
            self.state.delta_error = MISS_OFFSET.copysign(self.state.delta_paddle) - self.state.delta_paddle;
        }
        if let Some(paddle) = court.paddles(self.side).first() {
            if (paddle.y..=paddle.y + config.paddle_height).contains(&prediction.y) {
                self.state.delta_error = 0.0;
            }
        }

        self.state.plan = Plan::draw(prediction.ticks, rng);
        log::trace!(
            "AI plans for y = {:.1} in {:.1} steps ({:?}), offsets {:.1} + {:.1}.",
            prediction.y,
            prediction.ticks,
            prediction.shape,
            self.state.delta_paddle,
            self.state.delta_error
        );
        self.state.prediction = Some(prediction);
        self.state.mode = AiMode::Exchange;
    }

    /// Steer the AI paddle for one step.
    pub fn update(&mut self, ball: &Ball, court: &mut Court, speeds: &Speeds, config: &SimulationConfig) {
        let Some(paddle) = court.paddles_mut(self.side).first_mut() else {
            return;
        };
        let Some(prediction) = self.state.prediction.clone() else {
            return;
        };
        match self.state.mode {
            AiMode::Idle => {}
            AiMode::ServeTracking => {
                let aim = Aim {
                    target: prediction.y,
                    offset: 0.0,
                };
                self.steering
                    .step(paddle, aim, SERVE_TOLERANCE, Overshoot::Never, speeds.paddle, config);
            }
            AiMode::Exchange => self.exchange_step(&prediction, ball, paddle, speeds, config),
        }
    }

    fn exchange_step(
        &mut self,
        prediction: &Prediction,
        ball: &Ball,
        paddle: &mut Paddle,
        speeds: &Speeds,
        config: &SimulationConfig,
    ) {
        self.state.elapsed += 1;
        let elapsed = f64::from(self.state.elapsed);
        let plan = self.state.plan;
        let waiting = elapsed <= plan.depart;
        let in_fine_window = elapsed - plan.coarse - plan.depart <= plan.fine;
        let allowed = |flag: bool| if flag { Overshoot::AfterMoving } else { Overshoot::Never };
        let fine_overshoot = allowed(self.state.fine_overshoot);
        let coarse_overshoot = allowed(self.state.coarse_overshoot);

        let stage = match prediction.shape {
            BounceShape::Direct => {
                let overshoot = if self.state.delta_error == 0.0 {
                    coarse_overshoot
                } else {
                    Overshoot::Never
                };
                if waiting {
                    Stage::Wait
                } else if elapsed - plan.depart <= plan.coarse {
                    Stage::Coarse(DIRECT_COARSE_TOLERANCE, overshoot)
                } else if in_fine_window {
                    Stage::Fine(fine_overshoot)
                } else {
                    Stage::Wait
                }
            }
            BounceShape::SingleBeforeNet => {
                if ball.rebounds < 1 && waiting {
                    Stage::Wait
                } else if elapsed <= plan.coarse {
                    Stage::Coarse(BOUNCING_COARSE_TOLERANCE, coarse_overshoot)
                } else if in_fine_window {
                    Stage::Fine(fine_overshoot)
                } else {
                    Stage::Wait
                }
            }
            BounceShape::SingleAfterNet => {
                if waiting {
                    Stage::Wait
                } else if ball.rebounds < 1 {
                    Stage::Coarse(BOUNCING_COARSE_TOLERANCE, Overshoot::Always)
                } else {
                    Stage::Fine(Overshoot::Never)
                }
            }
            BounceShape::Multiple => {
                if ball.rebounds < 1 && waiting {
                    Stage::Wait
                } else if ball.rebounds < prediction.bounces {
                    Stage::Coarse(BOUNCING_COARSE_TOLERANCE, Overshoot::Always)
                } else {
                    Stage::Fine(Overshoot::Never)
                }
            }
        };

        let aim = Aim {
            target: prediction.y,
            offset: self.state.delta_paddle + self.state.delta_error,
        };
        let steered = match stage {
            Stage::Wait => return,
            Stage::Coarse(tolerance, overshoot) => {
                self.steering
                    .step(paddle, aim, tolerance, overshoot, speeds.paddle, config)
            }
            Stage::Fine(mut overshoot) => {
                if !self.state.entered_fine {
                    self.state.entered_fine = true;
                    self.steering.rearm();
                    if aim.distance(paddle, config).abs() < FINE_OVERSHOOT_CUTOFF {
                        self.state.fine_overshoot = false;
                        overshoot = Overshoot::Never;
                    }
                }
                let tolerance = if speeds.ball > FAST_BALL_SPEED {
                    FAST_FINE_TOLERANCE
                } else {
                    FINE_TOLERANCE
                };
                self.steering
                    .step(paddle, aim, tolerance, overshoot, speeds.paddle, config)
            }
        };
        if steered != Steer::Settled {
            log::trace!("AI paddle {steered:?} at y = {:.1}.", paddle.y);
        }
    }
}

enum Stage {
    Wait,
    Coarse(f64, Overshoot),
    Fine(Overshoot),
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::Mode;
    use crate::game::engine::{resolve_step, StepOutcome};

    use super::*;

    const BIAS: f64 = 1.0e-7;

    fn solo() -> (SimulationConfig, Court, Speeds) {
        let config = SimulationConfig::duel();
        let court = Court::new(Mode::Solo, &config);
        let mut speeds = Speeds::base(&config);
        speeds.ball = 12.0;
        (config, court, speeds)
    }

    /// A return from the left paddle face reaching the right paddle plane around y = 150.
    fn human_return() -> Ball {
        let angle = (-11.77_f64).to_radians();
        Ball {
            x: 40.0,
            y: 300.0,
            dx: 12.0 * angle.cos(),
            dy: 12.0 * angle.sin(),
            rebounds: 0,
        }
    }

    #[test]
    fn miss_chances() {
        assert_eq!(miss_chance(0, 10), 0.0);
        assert_eq!(miss_chance(3, 4), 0.0);
        assert!((miss_chance(4, 0) - 0.15).abs() < BIAS);
        assert!((miss_chance(8, -3) - 0.15).abs() < BIAS);
        assert!((miss_chance(9, 1) - 0.25).abs() < BIAS);
        assert!((miss_chance(11, 2) - 0.40).abs() < BIAS);
        assert!((miss_chance(12, 3) - 0.55).abs() < BIAS);
        assert!((miss_chance(20, 5) - 0.65).abs() < BIAS);
    }

    #[test]
    fn converges_on_the_ball_without_error() {
        for seed in 0..200 {
            let (config, mut court, mut speeds) = solo();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut ai = AiOpponent::new(Side::Right);
            let mut ball = human_return();
            ai.on_paddle_hit(Side::Left, &ball, &court, &Score::default(), &speeds, &mut rng, &config);
            assert_eq!(ai.state().mode, AiMode::Exchange);
            assert_eq!(ai.state().delta_error, 0.0);
            let prediction = ai.state().prediction.clone().expect("the ball heads to the AI");
            assert_eq!(prediction.shape, BounceShape::Direct);
            assert!((prediction.y - 150.0).abs() < 5.0);

            let mut outcome = StepOutcome::Moved;
            for _ in 0..200 {
                ai.update(&ball, &mut court, &speeds, &config);
                outcome = resolve_step(&mut ball, &court, &mut speeds, &config);
                if !matches!(outcome, StepOutcome::Moved | StepOutcome::WallBounce) {
                    break;
                }
            }
            assert_eq!(
                outcome,
                StepOutcome::PaddleHit {
                    side: Side::Right,
                    paddle: 0
                },
                "seed {seed}"
            );
            let paddle = &court.paddles(Side::Right)[0];
            let aimed = paddle.center(&config) + ai.state().delta_paddle;
            assert!((aimed - prediction.y).abs() <= 5.0 + BIAS, "seed {seed}: aimed {aimed}");
        }
    }

    #[test]
    fn returns_every_bounce_shape_without_error() {
        let mut shapes = [0; 4];
        let mut near_wall = 0;
        for seed in 0..3_000 {
            let (config, mut court, mut speeds) = solo();
            let mut rng = StdRng::seed_from_u64(seed);
            court.paddles_mut(Side::Right)[0].y = rng.gen_range(config.paddle_min_y()..=config.paddle_max_y());
            let angle = rng.gen_range(-45.0_f64..=45.0).to_radians();
            let mut ball = Ball {
                x: 40.0,
                y: rng.gen_range(config.margin + 1.0..=config.canvas_height - config.margin - 1.0),
                dx: 12.0 * angle.cos(),
                dy: 12.0 * angle.sin(),
                rebounds: 0,
            };
            let (prediction, outcome) = play_return(&mut ball, &mut court, &mut speeds, &mut rng, &config);
            assert_eq!(
                outcome,
                StepOutcome::PaddleHit {
                    side: Side::Right,
                    paddle: 0
                },
                "seed {seed}: {:?} toward y = {:.1}",
                prediction.shape,
                prediction.y
            );
            shapes[match prediction.shape {
                BounceShape::Direct => 0,
                BounceShape::SingleBeforeNet => 1,
                BounceShape::SingleAfterNet => 2,
                BounceShape::Multiple => 3,
            }] += 1;
            let half = config.paddle_height / 2.0;
            if prediction.shape != BounceShape::Direct
                && (prediction.y < half || prediction.y > config.canvas_height - half)
            {
                near_wall += 1;
            }
        }
        assert!(shapes.iter().all(|&count| count > 0), "shapes {shapes:?}");
        // Rebounding balls arriving within half a paddle of a wall.
        assert!(near_wall > 0);
    }

    /// Play a human return, with no miss planned, until the ball reaches the AI side.
    fn play_return(
        ball: &mut Ball,
        court: &mut Court,
        speeds: &mut Speeds,
        rng: &mut StdRng,
        config: &SimulationConfig,
    ) -> (Prediction, StepOutcome) {
        let mut ai = AiOpponent::new(Side::Right);
        ai.on_paddle_hit(Side::Left, ball, court, &Score::default(), speeds, rng, config);
        assert_eq!(ai.state().delta_error, 0.0);
        let prediction = ai.state().prediction.clone().expect("the ball heads to the AI");

        let mut outcome = StepOutcome::Moved;
        for _ in 0..300 {
            ai.update(ball, court, speeds, config);
            outcome = resolve_step(ball, court, speeds, config);
            if !matches!(outcome, StepOutcome::Moved | StepOutcome::WallBounce) {
                break;
            }
        }
        (prediction, outcome)
    }

    #[test]
    fn misses_on_purpose_at_the_expected_rate() {
        let (config, mut court, speeds) = solo();
        court.paddles_mut(Side::Right)[0].y = config.margin;
        for _ in 0..12 {
            court.record_shot(Side::Right);
        }
        let score = Score::new(0, 4);
        let mut ball = human_return();
        ball.dy = -ball.dy;
        let mut rng = StdRng::seed_from_u64(42);

        let mut misses = 0;
        let rounds = 4_000;
        for _ in 0..rounds {
            let mut ai = AiOpponent::new(Side::Right);
            ai.on_paddle_hit(Side::Left, &ball, &court, &score, &speeds, &mut rng, &config);
            let state = ai.state();
            assert!(state.delta_paddle.abs() <= MAX_PADDLE_OFFSET);
            if state.delta_error != 0.0 {
                misses += 1;
                assert!(((state.delta_paddle + state.delta_error).abs() - MISS_OFFSET).abs() < BIAS);
                // Pushed further out on the side the paddle already aims with.
                assert_eq!(state.delta_error.signum(), state.delta_paddle.signum());
            }
        }
        let rate = f64::from(misses) / f64::from(rounds);
        assert!((rate - 0.65).abs() < 0.05, "miss rate {rate}");
    }

    #[test]
    fn never_misses_early_in_a_rally() {
        let (config, mut court, speeds) = solo();
        court.paddles_mut(Side::Right)[0].y = config.margin;
        for _ in 0..3 {
            court.record_shot(Side::Right);
        }
        let mut ball = human_return();
        ball.dy = -ball.dy;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            let mut ai = AiOpponent::new(Side::Right);
            ai.on_paddle_hit(Side::Left, &ball, &court, &Score::new(0, 4), &speeds, &mut rng, &config);
            assert_eq!(ai.state().delta_error, 0.0);
        }
    }

    #[test]
    fn never_misses_a_ball_already_in_front() {
        let (config, mut court, speeds) = solo();
        // The span [100, 200] covers the arrival around y = 150.
        court.paddles_mut(Side::Right)[0].y = 100.0;
        for _ in 0..20 {
            court.record_shot(Side::Right);
        }
        let ball = human_return();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1_000 {
            let mut ai = AiOpponent::new(Side::Right);
            ai.on_paddle_hit(Side::Left, &ball, &court, &Score::new(0, 4), &speeds, &mut rng, &config);
            assert_eq!(ai.state().delta_error, 0.0);
        }
    }

    #[test]
    fn plan_splits_the_arrival_time() {
        let (config, court, speeds) = solo();
        let ball = human_return();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let mut ai = AiOpponent::new(Side::Right);
            ai.on_paddle_hit(Side::Left, &ball, &court, &Score::default(), &speeds, &mut rng, &config);
            let ticks = ai.state().prediction.as_ref().map_or(0.0, |p| p.ticks);
            let plan = ai.state().plan;
            assert!(plan.depart >= 0.10 * ticks && plan.depart < 0.20 * ticks);
            assert!(plan.fine >= 0.10 * ticks && plan.fine < 0.25 * ticks);
            assert!((plan.depart + plan.coarse + plan.fine - ticks).abs() < BIAS);
        }
    }

    #[test]
    fn idles_after_its_own_return() {
        let (config, court, speeds) = solo();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ai = AiOpponent::new(Side::Right);
        let ball = human_return();
        ai.on_paddle_hit(Side::Left, &ball, &court, &Score::default(), &speeds, &mut rng, &config);
        assert_eq!(ai.state().mode, AiMode::Exchange);

        let away = Ball {
            dx: -ball.dx,
            ..ball
        };
        ai.on_paddle_hit(Side::Right, &away, &court, &Score::default(), &speeds, &mut rng, &config);
        assert_eq!(ai.state(), &AiState::default());

        let mut court = court;
        let before = court.paddles(Side::Right)[0].clone();
        for _ in 0..50 {
            ai.update(&away, &mut court, &speeds, &config);
        }
        assert_eq!(court.paddles(Side::Right)[0], before);
    }

    #[test]
    fn tracks_serves_heading_its_way() {
        let (config, mut court, speeds) = solo();
        let mut ai = AiOpponent::new(Side::Right);
        let ball = Ball {
            dx: 5.0,
            dy: 2.0,
            ..Ball::centered(&config)
        };
        ai.on_serve(&ball, &speeds, &config);
        assert_eq!(ai.state().mode, AiMode::ServeTracking);
        let target = ai.state().prediction.as_ref().map_or(0.0, |p| p.y);
        for _ in 0..60 {
            ai.update(&ball, &mut court, &speeds, &config);
        }
        let center = court.paddles(Side::Right)[0].center(&config);
        assert!((center - target).abs() <= SERVE_TOLERANCE);

        let away = Ball {
            dx: -5.0,
            ..ball
        };
        ai.on_serve(&away, &speeds, &config);
        assert_eq!(ai.state().mode, AiMode::Idle);
        ai.reset();
        assert_eq!(ai.state(), &AiState::default());
    }

    #[test]
    fn bouncing_returns_move_before_the_rebound() {
        let (config, mut court, mut speeds) = solo();
        // Rebound in the AI half, arrival far below the paddle.
        let mut ball = Ball {
            x: 40.0,
            y: 550.0,
            dx: 10.0,
            dy: -10.0,
            rebounds: 0,
        };
        speeds.ball = f64::hypot(10.0, 10.0);
        court.paddles_mut(Side::Right)[0].y = 450.0;
        let mut rng = StdRng::seed_from_u64(9);
        let mut ai = AiOpponent::new(Side::Right);
        ai.on_paddle_hit(Side::Left, &ball, &court, &Score::default(), &speeds, &mut rng, &config);
        let prediction = ai.state().prediction.clone().expect("the ball heads to the AI");
        assert_eq!(prediction.shape, BounceShape::SingleAfterNet);

        let mut moved_before_rebound = false;
        for _ in 0..200 {
            ai.update(&ball, &mut court, &speeds, &config);
            if ball.rebounds == 0 && court.paddles(Side::Right)[0].y != 450.0 {
                moved_before_rebound = true;
            }
            if resolve_step(&mut ball, &court, &mut speeds, &config) != StepOutcome::Moved
                && ball.rebounds == 0
            {
                break;
            }
        }
        assert!(moved_before_rebound);
        assert!(ai.state().entered_fine);
    }
}
