//! Encapsulation of the match state: score, stage of the serve sequence and user-facing texts.

pub use done::GameResult;

use crate::config::Mode;

use super::Side;

mod done;

/// Current stage of a match.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Phase {
    /// Constructed, waiting for [`super::Game::start`].
    Ready,
    PreGameCountdown,
    Playing,
    /// A point was just scored, waiting for the entities to be recentered.
    Goal,
    PostGoalCountdown,
    /// A side reached the winning score. Only a restart leaves this stage.
    MatchOver,
    /// A restart was requested, waiting for the entities to be recentered.
    Restarting,
}

/// Flavour of countdown, which only changes the text shown.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub(super) enum CountdownKind {
    PreGame,
    Resume,
}

impl CountdownKind {
    pub(super) fn text(self, remaining: u32) -> String {
        match self {
            CountdownKind::PreGame => remaining.to_string(),
            CountdownKind::Resume => format!("Resuming in: {remaining}"),
        }
    }
}

/// Points of both sides.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Default)]
pub struct Score([u32; 2]);

impl Score {
    pub fn new(left: u32, right: u32) -> Score {
        Score([left, right])
    }

    pub fn of(&self, side: Side) -> u32 {
        self.0[side.index()]
    }

    /// Give one point to `side`, returning its new total.
    pub fn award(&mut self, side: Side) -> u32 {
        self.0[side.index()] += 1;
        self.0[side.index()]
    }

    /// Points `side` is ahead by, negative when behind.
    pub fn lead(&self, side: Side) -> i64 {
        i64::from(self.of(side)) - i64::from(self.of(!side))
    }

    /// The side that reached `target`, if any.
    pub fn winner(&self, target: u32) -> Option<Side> {
        Side::BOTH.into_iter().find(|&side| self.of(side) >= target)
    }

    pub fn reset(&mut self) {
        self.0 = [0, 0];
    }

    pub fn as_array(&self) -> [u32; 2] {
        self.0
    }
}

/// The state of a match, as opposed to the state of the entities on the court.
#[derive(Clone, Debug)]
pub struct MatchState {
    pub mode: Mode,
    pub score: Score,
    pub phase: Phase,
    /// User toggle suspending physics and AI, orthogonal to the phase.
    pub paused: bool,
    /// Set while a restart is pending, making any task left over from the previous match inert.
    pub restart_in_progress: bool,
    pub countdown_text: Option<String>,
    pub end_message: Option<String>,
    pub(super) countdown: Option<CountdownKind>,
}

impl MatchState {
    pub(super) fn new(mode: Mode) -> MatchState {
        MatchState {
            mode,
            score: Score::default(),
            phase: Phase::Ready,
            paused: false,
            restart_in_progress: false,
            countdown_text: None,
            end_message: None,
            countdown: None,
        }
    }

    /// Whether the match is still going on. False once a side won, until a restart.
    pub fn is_running(&self) -> bool {
        self.phase != Phase::MatchOver
    }

    /// Whether a countdown number is being shown.
    pub fn is_countdown_active(&self) -> bool {
        self.countdown.is_some()
    }

    /// Whether physics and AI run on this step.
    pub fn is_simulating(&self) -> bool {
        self.phase == Phase::Playing && !self.paused
    }

    /// Message announcing the winner of a match.
    pub(super) fn victory_text(&self, winner: Side) -> String {
        let (noun, number) = match (self.mode, winner) {
            (Mode::Team, Side::Left) => ("Team", 1),
            (Mode::Team, Side::Right) => ("Team", 2),
            (_, Side::Left) => ("Player", 1),
            (_, Side::Right) => ("Player", 2),
        };
        format!("{noun} {number} wins the match!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring() {
        let mut score = Score::default();
        assert_eq!(score.award(Side::Right), 1);
        assert_eq!(score.award(Side::Right), 2);
        assert_eq!(score.award(Side::Left), 1);
        assert_eq!(score, Score::new(1, 2));
        assert_eq!(score.lead(Side::Right), 1);
        assert_eq!(score.lead(Side::Left), -1);
        assert_eq!(score.winner(3), None);
        assert_eq!(score.award(Side::Right), 3);
        assert_eq!(score.winner(3), Some(Side::Right));
        score.reset();
        assert_eq!(score.as_array(), [0, 0]);
    }

    #[test]
    fn texts() {
        let state = MatchState::new(Mode::Team);
        assert_eq!(state.victory_text(Side::Right), "Team 2 wins the match!");
        let state = MatchState::new(Mode::Solo);
        assert_eq!(state.victory_text(Side::Left), "Player 1 wins the match!");
        assert_eq!(CountdownKind::Resume.text(2), "Resuming in: 2");
        assert_eq!(CountdownKind::PreGame.text(3), "3");
    }
}
