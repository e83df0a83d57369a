//! Core value types shared by every Skirmish layer.
//!
//! Everything in this module is a plain value: cheap to copy or clone,
//! comparable, serializable. The match core passes these to the host
//! capabilities and stores them in its own state; nothing here holds a
//! reference to the hosting environment.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable unique identifier for a player.
///
/// Newtype wrapper around `u64` so a `PlayerId` can never be confused with
/// a `MatchId` or a `QueueId`, even though all three are integers
/// underneath. `#[serde(transparent)]` keeps the serialized form a plain
/// number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// Display lets us log ids as structured fields: `tracing::info!(%player_id, ...)`
/// prints `player_id=P-42`.
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for one match session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// Identifies the queue a match was admitted from.
///
/// Sessions keep this value instead of a reference to the queue itself:
/// queues and sessions never share mutable state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct QueueId(pub u64);

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q-{}", self.0)
    }
}

/// Handle to a transient impostor presence spawned by the host.
///
/// Returned by [`PresenceController::spawn_impostor`](crate::PresenceController::spawn_impostor).
/// The impostor only ever exists in other observers' views, so the core
/// never needs to despawn it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpostorId(pub u64);

impl fmt::Display for ImpostorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TeamColor
// ---------------------------------------------------------------------------

/// The identity tag of a team within a session.
///
/// Two teams in the same session never share a color, so the color is
/// enough to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl TeamColor {
    /// Colors in assignment order. Queues hand them out by team index.
    pub const ALL: [TeamColor; 4] =
        [Self::Red, Self::Blue, Self::Green, Self::Yellow];

    /// Returns the color assigned to the `index`-th team, wrapping around.
    pub fn for_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "Red"),
            Self::Blue => write!(f, "Blue"),
            Self::Green => write!(f, "Green"),
            Self::Yellow => write!(f, "Yellow"),
        }
    }
}

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position plus orientation in the arena world.
///
/// Used for spawn points, the spectator vantage point, and the last known
/// position of an eliminated player (where the impostor is spawned).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Horizontal rotation in degrees.
    #[serde(default)]
    pub yaw: f32,
    /// Vertical rotation in degrees.
    #[serde(default)]
    pub pitch: f32,
}

impl Location {
    /// A location facing yaw 0, pitch 0.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, yaw: 0.0, pitch: 0.0 }
    }

    /// Returns a copy with the given orientation.
    pub fn facing(self, yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch, ..self }
    }

    /// The world cell this location falls into.
    pub fn block(&self) -> BlockPos {
        BlockPos {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }
}

/// Integer coordinates of one world cell.
///
/// The arena snapshot keys its mutation set by `BlockPos`, so it must be
/// `Hash + Eq`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Cue tags
// ---------------------------------------------------------------------------

/// Names a sound cue understood by the host (e.g. `"ambient.weather.thunder"`).
///
/// `Cow<'static, str>` lets the well-known cues be `const` while still
/// accepting owned names from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundTag(Cow<'static, str>);

impl SoundTag {
    /// Thunder clap played with the elimination strike.
    pub const THUNDER: SoundTag = SoundTag(Cow::Borrowed("ambient.weather.thunder"));
    /// Short tick played on each countdown second.
    pub const COUNTDOWN: SoundTag = SoundTag(Cow::Borrowed("note.hat"));
    /// Played when combat begins.
    pub const MATCH_START: SoundTag = SoundTag(Cow::Borrowed("note.pling"));
    /// Played when the result is announced.
    pub const MATCH_END: SoundTag = SoundTag(Cow::Borrowed("random.levelup"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SoundTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names a one-shot visual effect understood by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectTag(Cow<'static, str>);

impl EffectTag {
    /// The lightning strike shown where a player was eliminated.
    pub const LIGHTNING: EffectTag = EffectTag(Cow::Borrowed("lightning"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Status modifiers
// ---------------------------------------------------------------------------

/// The kind of a status modifier applied to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ModifierKind {
    /// Changes jump height. Large negative amplifiers pin the player
    /// to the ground.
    Jump,
}

/// A status modifier (potion-style effect) applied to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusModifier {
    pub kind: ModifierKind,
    pub amplifier: i32,
    /// `None` lasts until explicitly cleared.
    pub duration_ticks: Option<u32>,
}

impl StatusModifier {
    /// A modifier that lasts until cleared.
    pub fn permanent(kind: ModifierKind, amplifier: i32) -> Self {
        Self {
            kind,
            amplifier,
            duration_ticks: None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_id_display_prefixes() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(MatchId(3).to_string(), "M-3");
        assert_eq!(QueueId(1).to_string(), "Q-1");
        assert_eq!(ImpostorId(5).to_string(), "I-5");
    }

    #[test]
    fn test_team_color_for_index_wraps() {
        assert_eq!(TeamColor::for_index(0), TeamColor::Red);
        assert_eq!(TeamColor::for_index(1), TeamColor::Blue);
        assert_eq!(TeamColor::for_index(4), TeamColor::Red);
    }

    #[test]
    fn test_location_block_floors_negative_coordinates() {
        let loc = Location::new(-0.5, 64.9, 10.0);
        assert_eq!(loc.block(), BlockPos::new(-1, 64, 10));
    }

    #[test]
    fn test_location_deserializes_without_orientation() {
        let loc: Location =
            serde_json::from_str(r#"{"x":1.0,"y":2.0,"z":3.0}"#).unwrap();
        assert_eq!(loc, Location::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_sound_tag_const_and_owned_compare_equal() {
        let owned = SoundTag::new(String::from("ambient.weather.thunder"));
        assert_eq!(owned, SoundTag::THUNDER);
        assert_eq!(
            serde_json::to_string(&SoundTag::THUNDER).unwrap(),
            "\"ambient.weather.thunder\""
        );
    }

    #[test]
    fn test_status_modifier_permanent_has_no_duration() {
        let m = StatusModifier::permanent(ModifierKind::Jump, -5);
        assert_eq!(m.duration_ticks, None);
        assert_eq!(m.amplifier, -5);
    }
}
