//! An in-memory [`Host`](crate::Host) that records every instruction.
//!
//! Used by the test suites of the higher crates and by the demo binary.
//! It keeps just enough world state to answer the read-only queries
//! (player locations, staff roles, visibility, arena cells) and appends
//! every mutating call to a log so tests can assert on ordering.

use std::collections::{HashMap, HashSet};

use crate::{
    ArenaWorld, BlockPos, EffectTag, ImpostorId, Location, PlayerControl,
    PlayerId, PresenceController, PresentationError, SoundTag, StatusModifier,
};

/// One recorded instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Hide { observer: PlayerId, subject: PlayerId },
    Show { observer: PlayerId, subject: PlayerId },
    RemoveListing { observer: PlayerId, subject: PlayerId },
    SpawnImpostor { template: PlayerId, at: Location, impostor: ImpostorId },
    ShowImpostor { observer: PlayerId, impostor: ImpostorId },
    MarkDefeated { observer: PlayerId, impostor: ImpostorId },
    Effect { at: Location, effect: EffectTag, sound: SoundTag, audience: Vec<PlayerId> },
    Message { player: PlayerId, text: String },
    Sound { player: PlayerId, sound: SoundTag },
    Teleport { player: PlayerId, to: Location },
    Reset { player: PlayerId },
    WalkSpeed { player: PlayerId, speed: f32 },
    FlySpeed { player: PlayerId, speed: f32 },
    Flight { player: PlayerId, allow: bool, flying: bool },
    Modifier { player: PlayerId, modifier: StatusModifier },
    ClearModifiers { player: PlayerId },
    ClearCell { pos: BlockPos },
}

/// A host double that records instructions and tracks a little state.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    locations: HashMap<PlayerId, Location>,
    staff: HashSet<PlayerId>,
    unreachable: HashSet<PlayerId>,
    /// `(observer, subject)` pairs currently hidden.
    hidden: HashSet<(PlayerId, PlayerId)>,
    /// Non-empty arena cells and their block names.
    cells: HashMap<BlockPos, String>,
    next_impostor: u64,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an online player at `at`.
    pub fn place(&mut self, player: PlayerId, at: Location) {
        self.locations.insert(player, at);
    }

    /// Grants the staff observer role.
    pub fn grant_staff(&mut self, player: PlayerId) {
        self.staff.insert(player);
    }

    /// Makes every instruction targeting `player` fail with
    /// [`PresentationError::Unreachable`].
    pub fn disconnect(&mut self, player: PlayerId) {
        self.unreachable.insert(player);
        self.locations.remove(&player);
    }

    /// Writes a non-empty block into an arena cell (gameplay mutation).
    pub fn set_cell(&mut self, pos: BlockPos, block: impl Into<String>) {
        self.cells.insert(pos, block.into());
    }

    /// The block at `pos`, `None` when the cell is empty.
    pub fn cell(&self, pos: BlockPos) -> Option<&str> {
        self.cells.get(&pos).map(String::as_str)
    }

    /// Whether `observer` currently hides `subject`.
    pub fn is_hidden(&self, observer: PlayerId, subject: PlayerId) -> bool {
        self.hidden.contains(&(observer, subject))
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Drains the log, keeping world state.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Messages delivered to `player`, oldest first.
    pub fn messages_for(&self, player: PlayerId) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Message { player: p, text } if *p == player => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect()
    }

    fn reach(&self, player: PlayerId) -> Result<(), PresentationError> {
        if self.unreachable.contains(&player) {
            Err(PresentationError::Unreachable(player))
        } else {
            Ok(())
        }
    }
}

impl PresenceController for RecordingHost {
    fn hide(
        &mut self,
        observer: PlayerId,
        subject: PlayerId,
    ) -> Result<(), PresentationError> {
        self.reach(observer)?;
        self.hidden.insert((observer, subject));
        self.calls.push(HostCall::Hide { observer, subject });
        Ok(())
    }

    fn show(
        &mut self,
        observer: PlayerId,
        subject: PlayerId,
    ) -> Result<(), PresentationError> {
        self.reach(observer)?;
        self.hidden.remove(&(observer, subject));
        self.calls.push(HostCall::Show { observer, subject });
        Ok(())
    }

    fn remove_listing(
        &mut self,
        observer: PlayerId,
        subject: PlayerId,
    ) -> Result<(), PresentationError> {
        self.reach(observer)?;
        self.calls.push(HostCall::RemoveListing { observer, subject });
        Ok(())
    }

    fn spawn_impostor(
        &mut self,
        template: PlayerId,
        at: Location,
    ) -> Result<ImpostorId, PresentationError> {
        self.next_impostor += 1;
        let impostor = ImpostorId(self.next_impostor);
        self.calls.push(HostCall::SpawnImpostor { template, at, impostor });
        Ok(impostor)
    }

    fn show_impostor(
        &mut self,
        observer: PlayerId,
        impostor: ImpostorId,
    ) -> Result<(), PresentationError> {
        self.reach(observer)?;
        self.calls.push(HostCall::ShowImpostor { observer, impostor });
        Ok(())
    }

    fn mark_defeated(
        &mut self,
        observer: PlayerId,
        impostor: ImpostorId,
    ) -> Result<(), PresentationError> {
        self.reach(observer)?;
        self.calls.push(HostCall::MarkDefeated { observer, impostor });
        Ok(())
    }

    fn dispatch_effect(
        &mut self,
        at: Location,
        effect: &EffectTag,
        sound: &SoundTag,
        audience: &[PlayerId],
    ) -> Result<(), PresentationError> {
        let (reachable, missed): (Vec<PlayerId>, Vec<PlayerId>) = audience
            .iter()
            .copied()
            .partition(|p| !self.unreachable.contains(p));
        self.calls.push(HostCall::Effect {
            at,
            effect: effect.clone(),
            sound: sound.clone(),
            audience: reachable,
        });
        match missed.first() {
            Some(p) => Err(PresentationError::Unreachable(*p)),
            None => Ok(()),
        }
    }
}

impl PlayerControl for RecordingHost {
    fn location(&self, player: PlayerId) -> Option<Location> {
        self.locations.get(&player).copied()
    }

    fn has_staff_role(&self, player: PlayerId) -> bool {
        self.staff.contains(&player)
    }

    fn send_message(
        &mut self,
        player: PlayerId,
        text: &str,
    ) -> Result<(), PresentationError> {
        self.reach(player)?;
        self.calls.push(HostCall::Message {
            player,
            text: text.to_string(),
        });
        Ok(())
    }

    fn play_sound(
        &mut self,
        player: PlayerId,
        sound: &SoundTag,
    ) -> Result<(), PresentationError> {
        self.reach(player)?;
        self.calls.push(HostCall::Sound {
            player,
            sound: sound.clone(),
        });
        Ok(())
    }

    fn teleport(
        &mut self,
        player: PlayerId,
        to: Location,
    ) -> Result<(), PresentationError> {
        self.reach(player)?;
        self.locations.insert(player, to);
        self.calls.push(HostCall::Teleport { player, to });
        Ok(())
    }

    fn reset(&mut self, player: PlayerId) -> Result<(), PresentationError> {
        self.reach(player)?;
        self.calls.push(HostCall::Reset { player });
        Ok(())
    }

    fn set_walk_speed(
        &mut self,
        player: PlayerId,
        speed: f32,
    ) -> Result<(), PresentationError> {
        self.reach(player)?;
        self.calls.push(HostCall::WalkSpeed { player, speed });
        Ok(())
    }

    fn set_fly_speed(
        &mut self,
        player: PlayerId,
        speed: f32,
    ) -> Result<(), PresentationError> {
        self.reach(player)?;
        self.calls.push(HostCall::FlySpeed { player, speed });
        Ok(())
    }

    fn set_flight(
        &mut self,
        player: PlayerId,
        allow: bool,
        flying: bool,
    ) -> Result<(), PresentationError> {
        self.reach(player)?;
        self.calls.push(HostCall::Flight { player, allow, flying });
        Ok(())
    }

    fn apply_modifier(
        &mut self,
        player: PlayerId,
        modifier: StatusModifier,
    ) -> Result<(), PresentationError> {
        self.reach(player)?;
        self.calls.push(HostCall::Modifier { player, modifier });
        Ok(())
    }

    fn clear_modifiers(
        &mut self,
        player: PlayerId,
    ) -> Result<(), PresentationError> {
        self.reach(player)?;
        self.calls.push(HostCall::ClearModifiers { player });
        Ok(())
    }
}

impl ArenaWorld for RecordingHost {
    fn clear_cell(&mut self, pos: BlockPos) -> Result<(), PresentationError> {
        self.cells.remove(&pos);
        self.calls.push(HostCall::ClearCell { pos });
        Ok(())
    }
}
