//! Forward simulation of the ball up to the AI paddle.

use crate::config::SimulationConfig;
use crate::game::engine::bounce_off_horizontal_edges;
use crate::game::entities::Ball;
use crate::game::Side;

/// Upper bound on the number of steps walked, well above any real crossing of the court.
const MAX_PREDICTION_STEPS: u32 = 10_000;

/// Where the wall rebounds of a predicted trajectory happen, which decides how much time the AI has to read it.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum BounceShape {
    /// Straight to the paddle.
    Direct,
    /// A single rebound in the shooter's half, before the ball crosses the center line.
    SingleBeforeNet,
    /// A single rebound in the AI's own half.
    SingleAfterNet,
    /// Two rebounds or more.
    Multiple,
}

/// Predicted arrival of the ball on the plane of the AI paddle.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Height of the ball when reaching the paddle.
    pub y: f64,
    /// Length of the path travelled.
    pub distance: f64,
    /// Time to arrival, in steps.
    pub ticks: f64,
    pub bounces: u32,
    pub shape: BounceShape,
}

/// x coordinate of the face of the `side` paddle hit-box the ball arrives on.
pub fn paddle_plane(side: Side, config: &SimulationConfig) -> f64 {
    match side {
        Side::Left => config.paddle_inset + config.paddle_width,
        Side::Right => config.canvas_width - config.paddle_inset - config.paddle_width,
    }
}

/// Walk a copy of the ball step by step until it reaches the plane of the `side` paddle, bouncing on the walls like
/// the real ball does at the given speed. Returns [`None`] if the ball isn't heading to `side`.
pub fn predict(ball: &Ball, side: Side, speed: f64, config: &SimulationConfig) -> Option<Prediction> {
    if Side::facing(ball.dx) != Some(side) || speed <= 0.0 {
        return None;
    }
    let plane = paddle_plane(side, config);
    let reached = |x: f64| (x - plane) * side.direction() >= 0.0;
    let before_net = |x: f64| (x - config.canvas_width / 2.0) * side.direction() <= 0.0;

    let mut ghost = Ball {
        rebounds: 0,
        ..ball.clone()
    };
    let mut distance = 0.0;
    let (mut before, mut after) = (0, 0);

    for _ in 0..MAX_PREDICTION_STEPS {
        if reached(ghost.x) {
            let bounces = before + after;
            let shape = match (bounces, before) {
                (0, _) => BounceShape::Direct,
                (1, 1) => BounceShape::SingleBeforeNet,
                (1, _) => BounceShape::SingleAfterNet,
                _ => BounceShape::Multiple,
            };
            return Some(Prediction {
                y: ghost.y,
                distance,
                ticks: distance / speed,
                bounces,
                shape,
            });
        }
        let (previous_x, previous_y) = (ghost.x, ghost.y);
        ghost.x += ghost.dx;
        ghost.y += ghost.dy;
        if bounce_off_horizontal_edges(&mut ghost, speed, config) {
            if before_net(ghost.x) {
                before += 1;
            } else {
                after += 1;
            }
        }
        distance += f64::hypot(ghost.x - previous_x, ghost.y - previous_y);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIAS: f64 = 1.0e-7;

    fn ball(x: f64, y: f64, dx: f64, dy: f64) -> Ball {
        Ball {
            x,
            y,
            dx,
            dy,
            rebounds: 0,
        }
    }

    #[test]
    fn straight_line() {
        let config = SimulationConfig::duel();
        let prediction = predict(&ball(40.0, 300.0, 12.0, 0.0), Side::Right, 12.0, &config)
            .expect("the ball heads right");
        assert_eq!(prediction.shape, BounceShape::Direct);
        assert_eq!(prediction.bounces, 0);
        assert!((prediction.y - 300.0).abs() < BIAS);
        assert!((prediction.distance - 720.0).abs() < BIAS);
        assert!((prediction.ticks - 60.0).abs() < BIAS);
    }

    #[test]
    fn heading_away() {
        let config = SimulationConfig::duel();
        assert_eq!(
            predict(&ball(400.0, 300.0, -6.0, 1.0), Side::Right, 6.0, &config),
            None
        );
        assert_eq!(
            predict(&ball(400.0, 300.0, 0.0, 6.0), Side::Left, 6.0, &config),
            None
        );
    }

    #[test]
    fn bounces_are_classified_by_court_half() {
        let config = SimulationConfig::duel();
        let speed = f64::hypot(10.0, 10.0);

        // Rebound at x ~ 290, in the shooter's half.
        let early = predict(&ball(40.0, 250.0, 10.0, -10.0), Side::Right, speed, &config)
            .expect("the ball heads right");
        assert_eq!(early.shape, BounceShape::SingleBeforeNet);

        // Rebound at x ~ 590, in the AI half.
        let late = predict(&ball(40.0, 550.0, 10.0, -10.0), Side::Right, speed, &config)
            .expect("the ball heads right");
        assert_eq!(late.bounces, 1);
        assert_eq!(late.shape, BounceShape::SingleAfterNet);

        let steep = predict(&ball(40.0, 300.0, 5.0, 20.0), Side::Right, speed, &config)
            .expect("the ball heads right");
        assert!(steep.bounces >= 2);
        assert_eq!(steep.shape, BounceShape::Multiple);
    }

    #[test]
    fn mirrored_for_the_left_side() {
        let config = SimulationConfig::duel();
        let prediction = predict(&ball(760.0, 250.0, -10.0, -10.0), Side::Left, 10.0, &config)
            .expect("the ball heads left");
        assert_eq!(prediction.shape, BounceShape::SingleBeforeNet);
        assert!(prediction.y > config.margin && prediction.y < config.canvas_height);
    }
}
