//! Requests and the entries they become once queued.

use serde::{Deserialize, Serialize};
use skirmish_protocol::PlayerId;

/// One admission request: a solo player or a pre-formed party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRequest {
    /// The first requester leads the party.
    pub requesters: Vec<PlayerId>,
    /// Mode tag the requester asked for. `None` accepts the queue's mode.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub rating: Option<u32>,
}

impl QueueRequest {
    pub fn solo(player: PlayerId) -> Self {
        Self {
            requesters: vec![player],
            mode: None,
            rating: None,
        }
    }

    pub fn party(players: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            requesters: players.into_iter().collect(),
            mode: None,
            rating: None,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_rating(mut self, rating: u32) -> Self {
        self.rating = Some(rating);
        self
    }

    /// The requester that represents the request in logs and errors.
    pub fn leader(&self) -> Option<PlayerId> {
        self.requesters.first().copied()
    }
}

/// A request waiting in a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub requesters: Vec<PlayerId>,
    pub mode: Option<String>,
    pub rating: Option<u32>,
    /// Queue tick at which the request was accepted.
    pub enqueued_tick: u64,
}

impl QueueEntry {
    pub(crate) fn new(request: QueueRequest, now: u64) -> Self {
        Self {
            requesters: request.requesters,
            mode: request.mode,
            rating: request.rating,
            enqueued_tick: now,
        }
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.requesters.contains(&player)
    }

    /// Ticks spent waiting as of `now`.
    pub fn waited(&self, now: u64) -> u64 {
        now.saturating_sub(self.enqueued_tick)
    }

    pub fn size(&self) -> usize {
        self.requesters.len()
    }
}
