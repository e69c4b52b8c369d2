//! The "move toward a target with a tolerance" primitive shared by every AI phase.

use crate::config::SimulationConfig;
use crate::game::entities::Paddle;

/// Share of the entry offset the paddle drifts past its target when overshooting.
const OVERSHOOT_DAMPING: f64 = 0.8;

/// When the paddle may drift past its target after entering the tolerance band.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Overshoot {
    Never,
    /// Only if the paddle moved to get into the band during this phase.
    AfterMoving,
    Always,
}

/// What a steering step did.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Steer {
    Approaching,
    Overshooting,
    Settled,
}

/// Where the AI wants its paddle and how it gets there.
#[derive(Copy, Clone, Debug)]
pub struct Aim {
    /// Height the paddle should meet the ball at.
    pub target: f64,
    /// Offset from the paddle center of the point brought onto the target.
    pub offset: f64,
}

impl Aim {
    /// Signed distance from the aimed point of the paddle to the target.
    pub fn distance(&self, paddle: &Paddle, config: &SimulationConfig) -> f64 {
        self.target - (paddle.center(config) + self.offset)
    }
}

/// Movement memory of one phase of the AI.
#[derive(Clone, Debug, PartialEq)]
pub struct Steering {
    /// Whether the paddle moved during this phase.
    moved: bool,
    /// Cleared once the paddle entered the tolerance band, after which it only overshoots.
    approaching: bool,
    /// Aimed point minus target when entering the band.
    entry_offset: Option<f64>,
}

impl Default for Steering {
    fn default() -> Self {
        Steering {
            moved: false,
            approaching: true,
            entry_offset: None,
        }
    }
}

impl Steering {
    /// Start a new phase.
    pub fn rearm(&mut self) {
        *self = Steering::default();
    }

    /// Move `paddle` by at most `speed` so its aimed point gets within `tolerance` of the target.
    ///
    /// Once within the band the paddle stops, unless `overshoot` allows it to keep drifting in the same direction up
    /// to the mirror of its entry offset, damped by [`OVERSHOOT_DAMPING`]. The drift never reverses. With
    /// [`Overshoot::AfterMoving`] it is skipped when the target hugs the wall the paddle drifts toward.
    pub fn step(
        &mut self,
        paddle: &mut Paddle,
        aim: Aim,
        tolerance: f64,
        overshoot: Overshoot,
        speed: f64,
        config: &SimulationConfig,
    ) -> Steer {
        let distance = aim.distance(paddle, config);
        if distance.abs() <= tolerance {
            let drifts = match overshoot {
                Overshoot::Never => false,
                Overshoot::AfterMoving => self.moved,
                Overshoot::Always => true,
            };
            if !drifts {
                return Steer::Settled;
            }
            self.approaching = false;
            let entry_offset = *self.entry_offset.get_or_insert(-distance);
            let near_wall_stops = overshoot == Overshoot::AfterMoving;
            return self.overshoot(paddle, aim, entry_offset, near_wall_stops, speed, config);
        }
        if !self.approaching {
            return Steer::Settled;
        }
        let y = paddle.y + distance.signum() * f64::min(speed, distance.abs());
        paddle.set_y(y, config);
        self.moved = true;
        Steer::Approaching
    }

    fn overshoot(
        &self,
        paddle: &mut Paddle,
        aim: Aim,
        entry_offset: f64,
        near_wall_stops: bool,
        speed: f64,
        config: &SimulationConfig,
    ) -> Steer {
        // The paddle was heading down (+y) if its aimed point was above the target.
        let heading = -entry_offset.signum();
        let room_to_wall = match heading {
            h if h > 0.0 => config.canvas_height - aim.target,
            _ => aim.target,
        };
        if entry_offset == 0.0 || (near_wall_stops && room_to_wall < config.paddle_height / 2.0) {
            return Steer::Settled;
        }
        let goal = -OVERSHOOT_DAMPING * entry_offset;
        let current = -aim.distance(paddle, config);
        let remaining = (goal - current) * heading;
        if remaining <= 0.0 {
            return Steer::Settled;
        }
        paddle.set_y(paddle.y + heading * f64::min(speed, remaining), config);
        Steer::Overshooting
    }
}
