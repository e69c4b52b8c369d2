//! Scripted players standing in for humans when running headless.
//!
//! Each human paddle follows the ball while it heads to its side, aiming with a random point of the paddle drawn
//! again on every change of direction. Aim points drawn beyond the paddle edges make it miss, so matches end.

use rand::Rng;

use crate::config::SimulationConfig;
use crate::game::{Ball, Court, Side};
use crate::input::{Control, ControlState, InputFeed, PlayerId};

/// An [`InputFeed`] pressing the controls of every human paddle.
#[derive(Clone, Debug)]
pub struct Autopilot<R> {
    rng: R,
    /// Largest distance from the paddle center to the aimed point.
    spread: f64,
    /// Distance to the target under which a paddle stays still.
    dead_zone: f64,
    heading: Option<Side>,
    offsets: [f64; PlayerId::MAX as usize],
    controls: ControlState,
}

impl<R: Rng> Autopilot<R> {
    pub fn new(rng: R, spread: f64, dead_zone: f64) -> Autopilot<R> {
        Autopilot {
            rng,
            spread: spread.abs(),
            dead_zone: dead_zone.abs(),
            heading: None,
            offsets: [0.0; PlayerId::MAX as usize],
            controls: ControlState::new(),
        }
    }

    /// An autopilot missing now and then, tuned for the paddles of `config`.
    pub fn for_config(rng: R, config: &SimulationConfig) -> Autopilot<R> {
        Autopilot::new(rng, config.paddle_height * 0.6, config.margin)
    }

    /// Decide which controls are held for the next frame.
    pub fn steer(&mut self, ball: &Ball, court: &Court, config: &SimulationConfig) {
        let heading = Side::facing(ball.dx);
        if heading != self.heading {
            self.heading = heading;
            for offset in self.offsets.iter_mut() {
                *offset = self.rng.gen_range(-self.spread..=self.spread);
            }
        }

        self.controls.clear();
        let Some(heading) = heading else {
            return;
        };
        for paddle in court.paddles(heading) {
            let Some(player) = paddle.player else {
                continue;
            };
            let target = ball.y + self.offsets[usize::from(player.get() - 1)];
            let center = paddle.center(config);
            if target < center - self.dead_zone {
                self.controls.set(Control::Up(player), true);
            } else if target > center + self.dead_zone {
                self.controls.set(Control::Down(player), true);
            }
        }
    }
}

impl<R> InputFeed for Autopilot<R> {
    fn is_pressed(&self, control: Control) -> bool {
        self.controls.is_pressed(control)
    }
}
