//! Identities and host capabilities for Skirmish.
//!
//! This crate defines the vocabulary the match core shares with the
//! hosting environment:
//!
//! - **Types** ([`PlayerId`], [`MatchId`], [`Location`], [`BlockPos`], etc.):
//!   plain values passed between layers.
//! - **Capabilities** ([`PresenceController`], [`PlayerControl`],
//!   [`ArenaWorld`]): the instructions the core sends to the host. The core
//!   never talks to a concrete game server, only to these traits.
//! - **Errors** ([`PresentationError`]): what the host reports when an
//!   instruction can't be delivered.
//!
//! # Architecture
//!
//! ```text
//! Match core (skirmish-match) → capabilities (this crate) → host (game server)
//! ```
//!
//! # Feature Flags
//!
//! - `recording`: [`RecordingHost`], an in-memory host that records every
//!   instruction. Used by tests and demos.

mod error;
mod host;
#[cfg(feature = "recording")]
mod recording;
mod types;

pub use error::PresentationError;
pub use host::{ArenaWorld, Host, PlayerControl, PresenceController};
#[cfg(feature = "recording")]
pub use recording::{HostCall, RecordingHost};
pub use types::{
    BlockPos, EffectTag, ImpostorId, Location, MatchId, ModifierKind,
    PlayerId, QueueId, SoundTag, StatusModifier, TeamColor,
};
