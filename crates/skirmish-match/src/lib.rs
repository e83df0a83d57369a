//! Match lifecycle management for Skirmish.
//!
//! A match is a [`MatchSession`] owned by a [`MatchManager`]. Sessions are
//! plain state machines driven one tick at a time by whoever owns the
//! manager; they talk to the game server only through the
//! [`Host`](skirmish_protocol::Host) capabilities.
//!
//! # Key types
//!
//! - [`MatchManager`]: creates/tears down matches, routes players
//! - [`MatchSession`]: one match: roster, state, spectators, arena record
//! - [`MatchState`]: lifecycle state machine
//! - [`Roster`] / [`GameTeam`]: who plays for whom
//! - [`MatchConfig`]: countdown, delays, spectator movement

mod arena;
mod config;
mod context;
mod error;
mod manager;
mod roster;
mod session;
mod spectate;

pub use arena::{Arena, ArenaSnapshot};
pub use config::{MatchConfig, MatchState};
pub use context::{EndReason, Loadout, MatchContext, MatchRequest};
pub use error::MatchError;
pub use manager::{MatchEvent, MatchManager, MatchTask, MatchTasks};
pub use roster::{GameTeam, Roster, TeamMember};
pub use session::{MatchOutcome, MatchSession, MatchSummary, TeamSummary};
pub use spectate::SpectateOrigin;
