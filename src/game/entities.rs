//! Plain data of the moving elements: the ball and the paddles of each side.

use crate::config::{Mode, SimulationConfig};
use crate::input::{Control, PlayerId};

use super::engine::sweep::Rect;
use super::Side;

/// The ball. Its position is its center.
#[derive(Clone, Debug, PartialEq)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    /// Wall rebounds since the last paddle contact or serve.
    pub rebounds: u32,
}

impl Ball {
    pub fn centered(config: &SimulationConfig) -> Ball {
        Ball {
            x: config.canvas_width / 2.0,
            y: config.canvas_height / 2.0,
            dx: 0.0,
            dy: 0.0,
            rebounds: 0,
        }
    }

    pub fn speed(&self) -> f64 {
        f64::hypot(self.dx, self.dy)
    }

    /// Rescale the velocity to the given speed, keeping its direction. A still ball stays still.
    pub fn normalize_speed(&mut self, speed: f64) {
        let current = self.speed();
        if current != 0.0 {
            self.dx = self.dx / current * speed;
            self.dy = self.dy / current * speed;
        }
    }

    pub fn stop(&mut self) {
        (self.dx, self.dy) = (0.0, 0.0);
    }
}

/// Vertical band of the court a paddle is allowed to move in.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Lane {
    Full,
    Top,
    Bottom,
}

impl Lane {
    /// Allowed range for the top edge of a paddle in this lane.
    pub fn bounds(self, config: &SimulationConfig) -> (f64, f64) {
        let half = config.canvas_height / 2.0;
        match self {
            Lane::Full => (config.paddle_min_y(), config.paddle_max_y()),
            Lane::Top => (config.paddle_min_y(), half - config.paddle_height),
            Lane::Bottom => (half, config.paddle_max_y()),
        }
    }

    fn home_y(self, config: &SimulationConfig) -> f64 {
        let free_height = config.canvas_height - config.paddle_height;
        match self {
            Lane::Full => free_height / 2.0,
            Lane::Top => free_height / 4.0,
            Lane::Bottom => 3.0 * free_height / 4.0,
        }
    }
}

/// A paddle. `y` is its top edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Paddle {
    pub y: f64,
    pub lane: Lane,
    /// Human player steering this paddle, [`None`] for the AI.
    pub player: Option<PlayerId>,
}

impl Paddle {
    fn new(lane: Lane, player: Option<PlayerId>, config: &SimulationConfig) -> Paddle {
        Paddle {
            y: lane.home_y(config),
            lane,
            player,
        }
    }

    /// Set the position, clamped to the lane. Every write to a paddle position goes through here.
    pub fn set_y(&mut self, y: f64, config: &SimulationConfig) {
        let (min, max) = self.lane.bounds(config);
        self.y = f64::clamp(y, min, max);
    }

    pub fn center(&self, config: &SimulationConfig) -> f64 {
        self.y + config.paddle_height / 2.0
    }

    pub fn recenter(&mut self, config: &SimulationConfig) {
        self.set_y(self.lane.home_y(config), config);
    }

    /// Move along the human controls of this paddle, if it has any.
    fn apply_controls<I: crate::input::InputFeed + ?Sized>(
        &mut self,
        input: &I,
        speed: f64,
        config: &SimulationConfig,
    ) {
        let Some(player) = self.player else {
            return;
        };
        let mut y = self.y;
        if input.is_pressed(Control::Up(player)) {
            y -= speed;
        }
        if input.is_pressed(Control::Down(player)) {
            y += speed;
        }
        self.set_y(y, config);
    }
}

/// All paddles, grouped by side and ordered from top to bottom, plus the per-side return counters.
#[derive(Clone, Debug)]
pub struct Court {
    paddles: [Vec<Paddle>; 2],
    shots: [u32; 2],
}

impl Court {
    pub fn new(mode: Mode, config: &SimulationConfig) -> Court {
        let player = |n| Some(PlayerId::new(n));
        let paddles = match mode {
            Mode::Solo => [
                vec![Paddle::new(Lane::Full, player(1), config)],
                vec![Paddle::new(Lane::Full, None, config)],
            ],
            Mode::Versus => [
                vec![Paddle::new(Lane::Full, player(1), config)],
                vec![Paddle::new(Lane::Full, player(2), config)],
            ],
            Mode::Team => [
                vec![
                    Paddle::new(Lane::Top, player(1), config),
                    Paddle::new(Lane::Bottom, player(2), config),
                ],
                vec![
                    Paddle::new(Lane::Top, player(3), config),
                    Paddle::new(Lane::Bottom, player(4), config),
                ],
            ],
        };
        Court {
            paddles,
            shots: [0, 0],
        }
    }

    pub fn paddles(&self, side: Side) -> &[Paddle] {
        &self.paddles[side.index()]
    }

    pub fn paddles_mut(&mut self, side: Side) -> &mut [Paddle] {
        &mut self.paddles[side.index()]
    }

    /// Returns made by the given side since the last serve.
    pub fn shots(&self, side: Side) -> u32 {
        self.shots[side.index()]
    }

    pub fn record_shot(&mut self, side: Side) {
        self.shots[side.index()] += 1;
    }

    pub fn reset_shots(&mut self) {
        self.shots = [0, 0];
    }

    pub fn recenter(&mut self, config: &SimulationConfig) {
        for paddle in self.paddles.iter_mut().flatten() {
            paddle.recenter(config);
        }
    }

    /// Move every human paddle along its pressed controls.
    pub fn apply_controls<I: crate::input::InputFeed + ?Sized>(
        &mut self,
        input: &I,
        speed: f64,
        config: &SimulationConfig,
    ) {
        for paddle in self.paddles.iter_mut().flatten() {
            paddle.apply_controls(input, speed, config);
        }
    }

    /// Hit-box of a paddle: its drawn rectangle, grown by the margin vertically and toward its wall.
    pub fn hitbox(side: Side, paddle: &Paddle, config: &SimulationConfig) -> Rect {
        let width = config.paddle_width + config.margin;
        let x = match side {
            Side::Left => config.paddle_inset - config.margin,
            Side::Right => config.canvas_width - config.paddle_inset - config.paddle_width,
        };
        Rect {
            x,
            y: paddle.y - config.margin,
            width,
            height: config.paddle_height + 2.0 * config.margin,
        }
    }

    /// Drawn rectangle of a paddle.
    pub fn body(side: Side, paddle: &Paddle, config: &SimulationConfig) -> Rect {
        let x = match side {
            Side::Left => config.paddle_inset,
            Side::Right => config.canvas_width - config.paddle_inset - config.paddle_width,
        };
        Rect {
            x,
            y: paddle.y,
            width: config.paddle_width,
            height: config.paddle_height,
        }
    }
}
