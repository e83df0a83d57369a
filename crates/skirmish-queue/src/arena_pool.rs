//! The arenas a queue may start matches on.

use rand::Rng;
use rand::seq::IndexedRandom;
use skirmish_match::Arena;

/// A set of arena templates to pick from at random.
#[derive(Debug, Clone, Default)]
pub struct ArenaPool {
    arenas: Vec<Arena>,
}

impl ArenaPool {
    pub fn new(arenas: impl IntoIterator<Item = Arena>) -> Self {
        Self {
            arenas: arenas.into_iter().collect(),
        }
    }

    pub fn add(&mut self, arena: Arena) {
        self.arenas.push(arena);
    }

    /// Removes every arena called `name`. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.arenas.len();
        self.arenas.retain(|a| a.name != name);
        before - self.arenas.len()
    }

    /// A random arena, `None` if the pool is empty.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Arena> {
        self.arenas.choose(rng).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.arenas.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.arenas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arenas.is_empty()
    }
}
