//! Error types for the session layer.

use skirmish_protocol::PlayerId;

use crate::Activity;

/// Errors that can occur during session management.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The player already has a connected session.
    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),

    /// The disconnected player took longer than the grace period to come
    /// back.
    #[error("session expired for player {0}")]
    SessionExpired(PlayerId),

    /// The player is offline (disconnected but not yet expired).
    #[error("player {0} is not connected")]
    NotConnected(PlayerId),

    /// The player is busy with something else. A player can only be in
    /// one queue or one match at a time.
    #[error("player {player} is busy ({activity})")]
    Busy {
        player: PlayerId,
        activity: Activity,
    },
}
