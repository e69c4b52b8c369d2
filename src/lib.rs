//! Simulation core of a Pong game: fixed-step physics with swept collisions, the serve and scoring sequence of a
//! match, and a beatable AI opponent for solo play.
//!
//! Drawing, key capture and persistence are left to the caller, who feeds timestamps and an [`input::InputFeed`] to
//! [`game::Game::frame`] and draws the returned [`render::Frame`].

pub mod autopilot;
pub mod config;
pub mod game;
pub mod input;
pub mod render;

pub use config::{ConfigError, Mode, SimulationConfig};
pub use game::{Game, GameResult, Phase, Side};
pub use render::Frame;
