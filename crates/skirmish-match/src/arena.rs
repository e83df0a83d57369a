//! Arenas and the record of what a match changed in them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use skirmish_protocol::{ArenaWorld, BlockPos, Location};
use tracing::debug;

/// A map template: where teams spawn and where spectators watch from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub name: String,
    /// The middle of the map. Voluntary spectators are placed here.
    pub vantage: Location,
    /// One spawn per team, in team order.
    #[serde(default)]
    pub spawns: Vec<Location>,
}

impl Arena {
    pub fn new(name: impl Into<String>, vantage: Location) -> Self {
        Self {
            name: name.into(),
            vantage,
            spawns: Vec::new(),
        }
    }

    pub fn with_spawns(mut self, spawns: impl IntoIterator<Item = Location>) -> Self {
        self.spawns = spawns.into_iter().collect();
        self
    }

    /// Spawn point for the `index`-th team. Wraps when there are more
    /// teams than spawns, falls back to the vantage point when there are
    /// none.
    pub fn spawn_for(&self, index: usize) -> Location {
        if self.spawns.is_empty() {
            self.vantage
        } else {
            self.spawns[index % self.spawns.len()]
        }
    }

    /// An independent working copy for one match.
    pub fn isolated_copy(&self, match_label: &str) -> Self {
        Self {
            name: format!("{}#{}", self.name, match_label),
            ..self.clone()
        }
    }
}

/// Every arena cell a match has written to since it started.
///
/// Recording is idempotent: a cell changed twice is restored once.
#[derive(Debug, Clone, Default)]
pub struct ArenaSnapshot {
    mutated: HashSet<BlockPos>,
}

impl ArenaSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mutated cell. Returns `false` if it was already recorded.
    pub fn record(&mut self, pos: BlockPos) -> bool {
        self.mutated.insert(pos)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.mutated.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.mutated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutated.is_empty()
    }

    /// Clears every recorded cell in `world` and empties the record.
    ///
    /// Cells the world refuses to clear are logged and dropped; the record
    /// is empty afterwards either way, so a second call is a no-op.
    /// Returns the number of cells cleared successfully.
    pub fn restore(&mut self, world: &mut impl ArenaWorld) -> usize {
        let mut cleared = 0;
        for pos in self.mutated.drain() {
            match world.clear_cell(pos) {
                Ok(()) => cleared += 1,
                Err(e) => debug!(%pos, error = %e, "arena cell not restored"),
            }
        }
        cleared
    }
}
