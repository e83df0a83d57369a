//! Match configuration and the lifecycle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Tunables shared by every match a [`MatchManager`](crate::MatchManager)
/// runs.
///
/// All durations are in ticks of the match authority's clock, so the same
/// config behaves identically regardless of wall-clock jitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Rate of the authority's clock. Used to turn ticks into seconds for
    /// countdown messages and elapsed-time formatting.
    pub ticks_per_second: u32,

    /// Length of the pre-combat countdown (`Starting` state).
    pub countdown_ticks: u32,

    /// Delay between an elimination's immediate effects and the settle
    /// step that finishes the spectator conversion.
    pub settle_ticks: u32,

    /// Delay between the end of combat (`Ending`) and teardown (`Ended`).
    pub teardown_delay_ticks: u32,

    /// Combat time limit. `None` means unlimited.
    pub time_limit_ticks: Option<u64>,

    /// Jump amplifier applied while the elimination illusion plays.
    /// Large negative values keep the player on the ground.
    pub freeze_jump_amplifier: i32,

    /// Movement restored once a spectator has settled.
    pub spectator_fly_speed: f32,
    pub spectator_walk_speed: f32,

    /// Work on an independent copy of the arena template.
    pub isolate_arena: bool,

    /// Whether non-participants may spectate voluntarily.
    pub allow_spectators: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20,
            countdown_ticks: 100,
            settle_ticks: 20,
            teardown_delay_ticks: 60,
            time_limit_ticks: Some(20 * 60 * 15),
            freeze_jump_amplifier: -5,
            spectator_fly_speed: 0.4,
            spectator_walk_speed: 0.2,
            isolate_arena: false,
            allow_spectators: true,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// The lifecycle state of a match.
///
/// Transitions are strictly ordered, one step at a time:
///
/// ```text
/// Starting → Active → Ending → Ended
/// ```
///
/// - **Starting**: teams placed, countdown running. No combat.
/// - **Active**: the only state in which eliminations are processed.
/// - **Ending**: a result exists; it has been broadcast and handed off.
///   Teardown is scheduled.
/// - **Ended**: terminal. Arena restored, players released.
///
/// The derived `Ord` follows declaration order, so `a < b` means "`a`
/// comes before `b` in the lifecycle".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MatchState {
    Starting,
    Active,
    Ending,
    Ended,
}

impl MatchState {
    /// The state that follows this one, `None` for the terminal state.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Starting => Some(Self::Active),
            Self::Active => Some(Self::Ending),
            Self::Ending => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    /// Returns `true` if `target` is exactly one step ahead.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Starting or Active: the result is not decided yet.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Starting | Self::Active)
    }

    pub fn accepts_eliminations(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting"),
            Self::Active => write!(f, "Active"),
            Self::Ending => write!(f, "Ending"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_state_next_follows_strict_order() {
        assert_eq!(MatchState::Starting.next(), Some(MatchState::Active));
        assert_eq!(MatchState::Active.next(), Some(MatchState::Ending));
        assert_eq!(MatchState::Ending.next(), Some(MatchState::Ended));
        assert_eq!(MatchState::Ended.next(), None);
    }

    #[test]
    fn test_match_state_can_transition_to() {
        assert!(MatchState::Starting.can_transition_to(MatchState::Active));
        assert!(!MatchState::Starting.can_transition_to(MatchState::Ending));
        assert!(!MatchState::Ending.can_transition_to(MatchState::Active));
        assert!(!MatchState::Ended.can_transition_to(MatchState::Starting));
    }

    #[test]
    fn test_match_state_order_is_lifecycle_order() {
        assert!(MatchState::Starting < MatchState::Active);
        assert!(MatchState::Active < MatchState::Ending);
        assert!(MatchState::Ending < MatchState::Ended);
    }

    #[test]
    fn test_match_state_predicates() {
        assert!(MatchState::Active.accepts_eliminations());
        assert!(!MatchState::Starting.accepts_eliminations());
        assert!(MatchState::Starting.is_live());
        assert!(!MatchState::Ending.is_live());
        assert!(MatchState::Ended.is_terminal());
    }

    #[test]
    fn test_match_config_default() {
        let config = MatchConfig::default();
        assert_eq!(config.ticks_per_second, 20);
        assert_eq!(config.settle_ticks, 20);
        assert_eq!(config.freeze_jump_amplifier, -5);
        assert!(config.allow_spectators);
        assert!(!config.isolate_arena);
    }
}
