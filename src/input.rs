//! Logical controls and the input feed read at the top of each physics step.
//!
//! Capturing keys is left to the caller: it maps its own events onto [`Control`]s and stores their pressed state in
//! something implementing [`InputFeed`], usually a [`ControlState`].

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

/// Number of a human player, from 1 to [`PlayerId::MAX`].
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, PartialOrd, Ord)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const MAX: u8 = 4;

    /// Creates a [`PlayerId`]. Panics if `n` is not in `1..=PlayerId::MAX`, player numbers being hardcoded by
    /// the game modes.
    pub const fn new(n: u8) -> PlayerId {
        assert!(n >= 1 && n <= Self::MAX, "player numbers go from 1 to 4");
        PlayerId(n)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = ParseControlError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=PlayerId::MAX => Ok(PlayerId(value)),
            n => Err(ParseControlError::InvalidPlayer(n.to_string())),
        }
    }
}

/// A logical control, named `player-N-up` or `player-N-down` in text form.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum Control {
    Up(PlayerId),
    Down(PlayerId),
}

impl Control {
    pub fn player(self) -> PlayerId {
        match self {
            Control::Up(player) | Control::Down(player) => player,
        }
    }
}

impl Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Up(player) => write!(f, "player-{}-up", player.0),
            Control::Down(player) => write!(f, "player-{}-down", player.0),
        }
    }
}

/// Errors encountered when making a [`Control`] out of its name.
#[derive(thiserror::Error, Debug)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub enum ParseControlError {
    #[error("a control is named `player-N-up` or `player-N-down` - got `{0}`")]
    Malformed(String),

    #[error("players are numbered from 1 to 4 - got `{0}`")]
    InvalidPlayer(String),
}

impl FromStr for Control {
    type Err = ParseControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseControlError::Malformed(s.to_owned());
        let rest = s.strip_prefix("player-").ok_or_else(malformed)?;
        let (number, direction) = rest.split_once('-').ok_or_else(malformed)?;
        let player = number
            .parse::<u8>()
            .map_err(|_| ParseControlError::InvalidPlayer(number.to_owned()))
            .and_then(PlayerId::try_from)?;
        match direction {
            "up" => Ok(Control::Up(player)),
            "down" => Ok(Control::Down(player)),
            _ => Err(malformed()),
        }
    }
}

/// Read-only view of which controls are currently held.
pub trait InputFeed {
    fn is_pressed(&self, control: Control) -> bool;
}

/// Pressed state of every control, last write wins.
#[derive(Clone, Debug, Default)]
pub struct ControlState {
    pressed: HashMap<Control, bool>,
}

impl ControlState {
    pub fn new() -> ControlState {
        ControlState::default()
    }

    pub fn set(&mut self, control: Control, pressed: bool) {
        self.pressed.insert(control, pressed);
    }

    /// Release every control.
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

impl InputFeed for ControlState {
    fn is_pressed(&self, control: Control) -> bool {
        self.pressed.get(&control).copied().unwrap_or(false)
    }
}

/// No control is ever pressed.
impl InputFeed for () {
    fn is_pressed(&self, _control: Control) -> bool {
        false
    }
}
