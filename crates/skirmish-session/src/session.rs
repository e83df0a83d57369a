//! Session types: the server's record of one player.
//!
//! A session tracks:
//! - WHO the player is (`PlayerId`)
//! - WHETHER they are connected (and since when they aren't)
//! - WHAT they are doing (idle, queued, playing, spectating)

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use skirmish_protocol::{MatchId, PlayerId, QueueId};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long (in seconds) a disconnected player has to reconnect
    /// before their session is expired.
    ///
    /// Default: 30 seconds. Set to 0 to disable reconnection entirely.
    pub reconnect_grace_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_grace_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Whether the player's client is currently attached.
///
/// ```text
///   Connected ──(disconnect)──→ Disconnected ──(timeout)──→ Expired
///       ↑                            │
///       └────────(reconnect)─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    /// They have until `since + grace` to reconnect.
    Disconnected { since: Instant },
    Expired,
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// What a player is currently doing.
///
/// Only `Idle` players may enter a queue. Matches release their players
/// back to `Idle` when they end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activity {
    #[default]
    Idle,
    Queued(QueueId),
    Playing(MatchId),
    Spectating(MatchId),
}

impl Activity {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The match the player is playing in or watching, if any.
    pub fn match_id(&self) -> Option<MatchId> {
        match self {
            Self::Playing(id) | Self::Spectating(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Queued(q) => write!(f, "queued in {q}"),
            Self::Playing(m) => write!(f, "playing in {m}"),
            Self::Spectating(m) => write!(f, "spectating {m}"),
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerSession
// ---------------------------------------------------------------------------

/// A single player's session on the server.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    pub player_id: PlayerId,
    pub connection: ConnectionState,
    pub activity: Activity,
}

impl PlayerSession {
    pub fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionState::Connected)
    }
}
