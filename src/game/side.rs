//! Definition of the [`Side`] structure.

use std::fmt::{self, Display};
use std::ops::Not;

/// Enumeration symbolizing sides of the court : left or right.
///
/// The [`Not`] trait is implemented to support inversion using `!s` syntax.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Position of this side in per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Sign of a horizontal velocity heading toward this side.
    pub fn direction(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// The side a horizontal velocity is heading to, if it is moving at all.
    pub fn facing(dx: f64) -> Option<Side> {
        if dx < 0.0 {
            Some(Self::Left)
        } else if dx > 0.0 {
            Some(Self::Right)
        } else {
            None
        }
    }
}

impl Not for Side {
    type Output = Side;
    fn not(self) -> Self::Output {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}
