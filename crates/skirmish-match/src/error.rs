//! Error types for the match layer.

use skirmish_protocol::{MatchId, PlayerId, TeamColor};

use crate::MatchState;

/// Errors that can occur during match operations.
///
/// Absences in read-only queries are `Option`s, not errors. These
/// variants cover requests the caller made that the match refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The match does not exist (never created or already torn down).
    #[error("match {0} not found")]
    NotFound(MatchId),

    /// The player has no part in this match.
    #[error("player {0} not in match {1}")]
    NotInMatch(PlayerId, MatchId),

    /// The player has no part in any match.
    #[error("player {0} is not in any match")]
    NotInAnyMatch(PlayerId),

    /// A player can be in at most one match at a time.
    #[error("player {0} already in match {1}")]
    AlreadyInMatch(PlayerId, MatchId),

    /// The team list can't form a session (too few teams, empty team,
    /// repeated color).
    #[error("invalid roster: {0}")]
    InvalidRoster(String),

    /// The same identity appears twice in a team list.
    #[error("player {0} appears more than once in the roster")]
    DuplicateMember(PlayerId),

    #[error("team {0} not in match {1}")]
    UnknownTeam(TeamColor, MatchId),

    /// A transition that would skip a state.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: MatchState, to: MatchState },

    /// The match is in a state that doesn't allow this operation,
    /// e.g. an elimination reported after the result is decided.
    #[error("cannot {action} in match {match_id} while {state}")]
    InvalidState {
        match_id: MatchId,
        state: MatchState,
        action: &'static str,
    },

    #[error("player {0} is already eliminated")]
    AlreadyEliminated(PlayerId),

    #[error("player {0} is already spectating")]
    AlreadySpectating(PlayerId),

    #[error("player {0} is not a voluntary spectator")]
    NotSpectating(PlayerId),

    /// A combatant who is still alive can't switch to spectating.
    #[error("player {0} is still competing")]
    StillCompeting(PlayerId),

    /// The player's elimination transition hasn't settled yet.
    #[error("player {0} is mid-transition")]
    TransitionInProgress(PlayerId),

    #[error("match {0} does not allow spectators")]
    SpectatorsDisabled(MatchId),
}
