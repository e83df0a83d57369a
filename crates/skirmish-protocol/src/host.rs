//! Capability traits the match core uses to reach the hosting environment.
//!
//! The core never owns a network connection, an entity, or a world. It
//! owns *decisions*: who should see whom, where an effect plays, which
//! cell to reset. The host turns those decisions into packets.
//!
//! Three traits split the surface by concern:
//!
//! - [`PresenceController`]: visibility, presence-list entries, impostors
//!   and positioned effects. This is the genuinely protocol-specific part.
//! - [`PlayerControl`]: per-player instructions (messages, sounds,
//!   teleports, movement, status modifiers) and two read-only queries.
//! - [`ArenaWorld`]: writes to arena cells.
//!
//! [`Host`] is implemented for anything that implements all three, so the
//! core can take a single `&mut impl Host`.
//!
//! Every instruction returns `Result<_, PresentationError>`. The core logs
//! failures and carries on: an unreachable observer must not stall the
//! match for everyone else.

use crate::{
    BlockPos, EffectTag, ImpostorId, Location, PlayerId, PresentationError,
    SoundTag, StatusModifier,
};

/// Controls who sees whom.
///
/// `observer` is always the player whose client receives the instruction;
/// `subject` is the player being shown or hidden.
pub trait PresenceController {
    /// Stops rendering `subject` on `observer`'s client.
    fn hide(
        &mut self,
        observer: PlayerId,
        subject: PlayerId,
    ) -> Result<(), PresentationError>;

    /// Starts rendering `subject` on `observer`'s client.
    fn show(
        &mut self,
        observer: PlayerId,
        subject: PlayerId,
    ) -> Result<(), PresentationError>;

    /// Removes `subject`'s presence-list (tab list) entry from `observer`'s
    /// client without touching the rendered entity.
    fn remove_listing(
        &mut self,
        observer: PlayerId,
        subject: PlayerId,
    ) -> Result<(), PresentationError>;

    /// Creates an impostor that copies `template`'s appearance, positioned
    /// at `at` (orientation included).
    ///
    /// The impostor is not visible to anyone until
    /// [`show_impostor`](Self::show_impostor) is called for an observer.
    fn spawn_impostor(
        &mut self,
        template: PlayerId,
        at: Location,
    ) -> Result<ImpostorId, PresentationError>;

    /// Inserts the impostor's presence-list entry on `observer`'s client
    /// and spawns its visible body there.
    fn show_impostor(
        &mut self,
        observer: PlayerId,
        impostor: ImpostorId,
    ) -> Result<(), PresentationError>;

    /// Plays the "defeated" status animation of `impostor` for `observer`,
    /// the same indicator used for a regular player death.
    fn mark_defeated(
        &mut self,
        observer: PlayerId,
        impostor: ImpostorId,
    ) -> Result<(), PresentationError>;

    /// Plays a visual effect and a sound cue anchored at `at` for every
    /// player in `audience`.
    ///
    /// Hosts deliver to every reachable member of the audience and report
    /// the first member they could not reach.
    fn dispatch_effect(
        &mut self,
        at: Location,
        effect: &EffectTag,
        sound: &SoundTag,
        audience: &[PlayerId],
    ) -> Result<(), PresentationError>;
}

/// Per-player instructions and queries.
pub trait PlayerControl {
    /// Last known position of an online player. `None` if offline.
    fn location(&self, player: PlayerId) -> Option<Location>;

    /// Whether the player holds the staff observer role. Staff spectate
    /// silently.
    fn has_staff_role(&self, player: PlayerId) -> bool;

    fn send_message(
        &mut self,
        player: PlayerId,
        text: &str,
    ) -> Result<(), PresentationError>;

    /// Plays `sound` at the player's own position.
    fn play_sound(
        &mut self,
        player: PlayerId,
        sound: &SoundTag,
    ) -> Result<(), PresentationError>;

    fn teleport(
        &mut self,
        player: PlayerId,
        to: Location,
    ) -> Result<(), PresentationError>;

    /// Clears inventory, armor, status modifiers, health and hunger.
    fn reset(&mut self, player: PlayerId) -> Result<(), PresentationError>;

    fn set_walk_speed(
        &mut self,
        player: PlayerId,
        speed: f32,
    ) -> Result<(), PresentationError>;

    fn set_fly_speed(
        &mut self,
        player: PlayerId,
        speed: f32,
    ) -> Result<(), PresentationError>;

    /// `allow` grants the ability to fly; `flying` puts the player in the
    /// air right away.
    fn set_flight(
        &mut self,
        player: PlayerId,
        allow: bool,
        flying: bool,
    ) -> Result<(), PresentationError>;

    fn apply_modifier(
        &mut self,
        player: PlayerId,
        modifier: StatusModifier,
    ) -> Result<(), PresentationError>;

    /// Removes every active status modifier.
    fn clear_modifiers(
        &mut self,
        player: PlayerId,
    ) -> Result<(), PresentationError>;
}

/// Write access to arena cells.
pub trait ArenaWorld {
    /// Resets one cell to its empty/default state.
    ///
    /// Must be idempotent: clearing an already empty cell is a no-op.
    fn clear_cell(&mut self, pos: BlockPos) -> Result<(), PresentationError>;
}

/// Everything the match core needs from its host.
pub trait Host: PresenceController + PlayerControl + ArenaWorld {}

impl<T: PresenceController + PlayerControl + ArenaWorld> Host for T {}
