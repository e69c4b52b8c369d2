//! Implementation of the logic of the Pong game.
//!
//! A [`Game`] owns everything about one match and is driven by one call to [`Game::frame`] per display frame. Between
//! frames, the caller may use the lifecycle controls: [`Game::start`], [`Game::pause`], [`Game::resume`],
//! [`Game::toggle_pause`] and [`Game::restart`]. Nothing here waits or spawns: timestamps are supplied by the caller,
//! and the delays of the serve sequence are deferred tasks fired by the frames reaching their deadline.

use std::time::Duration;

use rand::Rng;

pub use ai::{AiMode, AiOpponent, AiState, BounceShape, Prediction};
pub use engine::sweep::{Point, Rect};
pub use engine::{ServiceGenerator, Speeds, StepOutcome};
pub use entities::{Ball, Court, Lane, Paddle};
pub use side::Side;
pub use state::{GameResult, MatchState, Phase, Score};

use crate::config::{ConfigError, Mode, SimulationConfig, FIXED_TIMESTEP, MAX_FRAME_DELTA};
use crate::input::InputFeed;
use crate::render::{Frame, Telemetry};
use clock::FixedStep;
use engine::{resolve_step, service_velocity};
use state::CountdownKind;
use timers::{Deferred, Fired, Scheduler};

pub mod ai;
pub mod clock;
pub mod engine;
pub mod entities;
mod side;
mod state;
pub mod timers;

const PRE_GAME_TEXT: &str = "Match starting in";
const RESTART_TEXT: &str = "New match...";

/// One match of Pong, in any [`Mode`].
#[derive(Debug)]
pub struct Game<R> {
    config: SimulationConfig,
    state: MatchState,
    ball: Ball,
    court: Court,
    speeds: Speeds,
    ai: Option<AiOpponent>,
    scheduler: Scheduler,
    /// Bumped by every restart. Tasks scheduled for an older generation are inert.
    generation: u64,
    clock: FixedStep,
    service_generator: ServiceGenerator,
    rng: R,
    /// Timestamp of the latest frame or lifecycle call.
    now: Duration,
    started_at: Duration,
    playing_time: Duration,
    result: Option<GameResult>,
}

impl<R: Rng> Game<R> {
    /// Creates a [`Game`] waiting for [`Game::start`], with everything in place for the first serve.
    pub fn new(mode: Mode, config: SimulationConfig, rng: R) -> Result<Game<R>, ConfigError> {
        config.validate(mode.paddles_per_side())?;
        Ok(Game {
            state: MatchState::new(mode),
            ball: Ball::centered(&config),
            court: Court::new(mode, &config),
            speeds: Speeds::base(&config),
            ai: mode.has_ai().then(|| AiOpponent::new(Side::Right)),
            scheduler: Scheduler::new(),
            generation: 0,
            clock: FixedStep::new(FIXED_TIMESTEP, MAX_FRAME_DELTA),
            service_generator: ServiceGenerator::new(),
            rng,
            now: Duration::ZERO,
            started_at: Duration::ZERO,
            playing_time: Duration::ZERO,
            result: None,
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn court(&self) -> &Court {
        &self.court
    }

    pub fn speeds(&self) -> &Speeds {
        &self.speeds
    }

    pub fn ai(&self) -> Option<&AiOpponent> {
        self.ai.as_ref()
    }

    /// Result of the match, once a side reached the winning score.
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    /// Begin the pre-game countdown. Only a game that was never started can be started.
    pub fn start(&mut self, now: Duration) {
        if self.state.phase != Phase::Ready {
            log::warn!("Ignoring a start request in the {:?} phase.", self.state.phase);
            return;
        }
        self.now = now;
        self.started_at = now;
        self.state.phase = Phase::PreGameCountdown;
        self.state.countdown_text = Some(PRE_GAME_TEXT.to_owned());
        self.schedule(now + self.config.countdown_delay, Deferred::CountdownBegin);
        log::info!("Starting a {} match to {} points.", self.state.mode, self.config.score_to_win);
    }

    pub fn pause(&mut self) {
        if !self.state.paused {
            self.state.paused = true;
            log::debug!("Game paused.");
        }
    }

    pub fn resume(&mut self) {
        if self.state.paused {
            self.state.paused = false;
            log::debug!("Game resumed.");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.state.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Abandon the current match, whatever its stage, and start a new one after a short delay.
    pub fn restart(&mut self, now: Duration) {
        let cancelled = self.scheduler.cancel_all();
        self.generation += 1;
        self.state.restart_in_progress = true;
        log::info!("Restarting the match, {cancelled} pending task(s) cancelled.");

        self.now = now;
        self.started_at = now;
        self.playing_time = Duration::ZERO;
        self.clock.reset();
        self.ball.stop();
        self.state.score.reset();
        self.speeds = Speeds::base(&self.config);
        self.court.reset_shots();
        if let Some(ai) = &mut self.ai {
            ai.reset();
        }
        self.result = None;
        self.state.paused = false;
        self.state.end_message = None;
        self.state.countdown = None;
        self.state.countdown_text = Some(RESTART_TEXT.to_owned());
        self.state.phase = Phase::Restarting;
        self.schedule(now + self.config.restart_delay, Deferred::RestartRecenter);
    }

    /// Fire the due deferred tasks, run as many physics steps as the time elapsed since the previous frame is worth,
    /// and return what to draw.
    pub fn frame<I: InputFeed + ?Sized>(&mut self, now: Duration, input: &I) -> Frame {
        self.now = now;
        while let Some(fired) = self.scheduler.pop_due(now) {
            self.fire(fired);
        }
        let steps = self.clock.advance(now);
        for _ in 0..steps {
            self.step(input);
        }
        self.snapshot(steps)
    }

    fn schedule(&mut self, due: Duration, task: Deferred) {
        self.scheduler.schedule(due, self.generation, task);
    }

    fn fire(&mut self, fired: Fired) {
        if fired.generation != self.generation {
            log::debug!("Ignoring {:?} left over from a previous match.", fired.task);
            return;
        }
        if self.state.restart_in_progress && fired.task != Deferred::RestartRecenter {
            log::debug!("Ignoring {:?} during a restart.", fired.task);
            return;
        }

        let from = self.config.countdown_from;
        let step = self.config.countdown_step;
        match fired.task {
            Deferred::CountdownBegin => {
                let kind = match self.state.phase {
                    Phase::PreGameCountdown => CountdownKind::PreGame,
                    _ => CountdownKind::Resume,
                };
                self.show_countdown(kind, from);
                self.schedule(fired.due + step, Deferred::CountdownTick { remaining: from - 1 });
            }
            Deferred::CountdownTick { remaining: 0 } => self.serve(),
            Deferred::CountdownTick { remaining } => {
                let kind = self.state.countdown.unwrap_or(CountdownKind::Resume);
                self.show_countdown(kind, remaining);
                self.schedule(fired.due + step, Deferred::CountdownTick { remaining: remaining - 1 });
            }
            Deferred::GoalRecenter => {
                self.recenter();
                self.state.phase = Phase::PostGoalCountdown;
                log::debug!("Entering the {:?} phase.", self.state.phase);
                self.schedule(fired.due + self.config.countdown_delay, Deferred::CountdownBegin);
            }
            Deferred::RestartRecenter => {
                self.recenter();
                self.state.restart_in_progress = false;
                self.state.phase = Phase::PreGameCountdown;
                log::debug!("Entering the {:?} phase.", self.state.phase);
                self.show_countdown(CountdownKind::Resume, from);
                self.schedule(fired.due + step, Deferred::CountdownTick { remaining: from - 1 });
            }
            Deferred::EndMessage => {
                if let Some(result) = &self.result {
                    let message = self.state.victory_text(result.winner);
                    log::info!("{message}");
                    self.state.end_message = Some(message);
                }
            }
        }
    }

    fn show_countdown(&mut self, kind: CountdownKind, remaining: u32) {
        self.state.countdown = Some(kind);
        self.state.countdown_text = Some(kind.text(remaining));
    }

    fn recenter(&mut self) {
        self.ball = Ball::centered(&self.config);
        self.court.recenter(&self.config);
    }

    /// Send the ball from the center of the court along a random playable angle.
    fn serve(&mut self) {
        self.state.countdown = None;
        self.state.countdown_text = None;
        self.ball = Ball::centered(&self.config);
        let angle = self.service_generator.gen_angle(&mut self.rng);
        (self.ball.dx, self.ball.dy) = service_velocity(angle, self.speeds.ball);
        self.court.reset_shots();
        self.speeds.restart_ramp();
        self.playing_time = Duration::ZERO;
        self.state.phase = Phase::Playing;
        if let Some(ai) = &mut self.ai {
            ai.on_serve(&self.ball, &self.speeds, &self.config);
        }
        log::debug!("Serve at {angle:.2} rad.");
    }

    /// One physics step: AI, human controls, speed ramp and ball movement, in that order.
    fn step<I: InputFeed + ?Sized>(&mut self, input: &I) {
        if !self.state.is_simulating() {
            return;
        }
        self.playing_time += self.clock.step();
        if let Some(ai) = &mut self.ai {
            ai.update(&self.ball, &mut self.court, &self.speeds, &self.config);
        }
        self.court.apply_controls(input, self.speeds.paddle, &self.config);
        self.speeds.ramp(self.clock.step(), &self.config);

        match resolve_step(&mut self.ball, &self.court, &mut self.speeds, &self.config) {
            StepOutcome::Moved => {}
            StepOutcome::WallBounce => {
                log::debug!("Ball bounced off a wall at x = {:.1}.", self.ball.x);
            }
            StepOutcome::PaddleHit { side, .. } => {
                self.court.record_shot(side);
                if let Some(ai) = &mut self.ai {
                    ai.on_paddle_hit(
                        side,
                        &self.ball,
                        &self.court,
                        &self.state.score,
                        &self.speeds,
                        &mut self.rng,
                        &self.config,
                    );
                }
            }
            StepOutcome::Goal { scorer } => self.goal(scorer),
        }
    }

    fn goal(&mut self, scorer: Side) {
        self.ball.stop();
        self.state.score.award(scorer);
        if let Some(ai) = &mut self.ai {
            ai.reset();
        }
        let [left, right] = self.state.score.as_array();
        log::info!("The {scorer} side scores: {left} - {right}.");

        if let Some(winner) = self.state.score.winner(self.config.score_to_win) {
            self.state.phase = Phase::MatchOver;
            let result = GameResult::new(
                self.state.mode,
                self.state.score.as_array(),
                winner,
                self.now.saturating_sub(self.started_at),
            );
            log::info!("Match over after {:.1} s, the {winner} side wins.", result.duration.as_secs_f64());
            self.result = Some(result);
            self.schedule(self.now + self.config.end_message_delay, Deferred::EndMessage);
        } else {
            self.speeds = Speeds::base(&self.config);
            self.state.phase = Phase::Goal;
            self.schedule(self.now + self.config.goal_delay, Deferred::GoalRecenter);
        }
    }

    fn snapshot(&self, steps: u32) -> Frame {
        Frame {
            ball: Point::new(self.ball.x, self.ball.y),
            paddles: Side::BOTH.map(|side| {
                self.court
                    .paddles(side)
                    .iter()
                    .map(|paddle| Court::body(side, paddle, &self.config))
                    .collect()
            }),
            score: self.state.score.as_array(),
            phase: self.state.phase,
            paused: self.state.paused,
            countdown_text: self.state.countdown_text.clone(),
            end_message: self.state.end_message.clone(),
            telemetry: Telemetry {
                ball_speed: self.ball.speed(),
                configured_ball_speed: self.speeds.ball,
                paddle_speed: self.speeds.paddle,
                playing_time: self.playing_time,
            },
            steps,
        }
    }
}
