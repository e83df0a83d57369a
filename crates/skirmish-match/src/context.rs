//! What a queue hands to the match layer when it forms a match.

use std::fmt;

use serde::{Deserialize, Serialize};
use skirmish_protocol::{QueueId, TeamColor};

use crate::{Arena, GameTeam};

/// Describes the kind of match being played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchContext {
    /// Short mode name shown to players, e.g. `"1v1"` or `"party 2v2"`.
    pub mode: String,
    /// Ranked results feed rating updates downstream.
    #[serde(default)]
    pub ranked: bool,
}

impl MatchContext {
    pub fn casual(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            ranked: false,
        }
    }

    pub fn ranked(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            ranked: true,
        }
    }
}

impl fmt::Display for MatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ranked {
            write!(f, "ranked {}", self.mode)
        } else {
            write!(f, "{}", self.mode)
        }
    }
}

/// The equipment kit players fight with. Opaque to the match layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    pub name: String,
}

impl Loadout {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Everything needed to start one match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    pub context: MatchContext,
    pub loadout: Loadout,
    pub arena: Arena,
    /// The queue that formed the match.
    pub origin: QueueId,
    pub teams: Vec<GameTeam>,
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// At most one team had members left alive.
    Elimination,
    TimeLimit,
    /// A team gave up.
    Forfeit { team: TeamColor },
    /// Stopped by the operator. No winner.
    Aborted,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elimination => write!(f, "elimination"),
            Self::TimeLimit => write!(f, "time limit"),
            Self::Forfeit { team } => write!(f, "{team} forfeited"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}
