//! The queue contract and its one implementation, parameterized by policy.

use std::collections::{BTreeSet, HashSet};

use skirmish_match::{GameTeam, Loadout, MatchContext, MatchRequest};
use skirmish_protocol::{PlayerId, QueueId, TeamColor};
use tracing::{debug, info};

use crate::{AdmissionPolicy, ArenaPool, QueueEntry, QueueError, QueueRequest};

/// What every queue offers the orchestrator, whatever its policy.
///
/// Object safe, so an orchestrator can hold `Box<dyn MatchQueue>` of
/// different policies side by side.
pub trait MatchQueue: Send {
    fn id(&self) -> QueueId;

    /// The context matches from this queue are played under.
    fn context(&self) -> &MatchContext;

    /// Name of the admission policy.
    fn policy_name(&self) -> &'static str;

    /// Adds a request. Rejected if any requester is already waiting here
    /// or the request doesn't fit the policy.
    fn enqueue(&mut self, request: QueueRequest) -> Result<(), QueueError>;

    /// Withdraws the entry containing `player`. Returns the identities that
    /// left with it (the whole party), empty if `player` wasn't queued.
    fn dequeue(&mut self, player: PlayerId) -> Vec<PlayerId>;

    /// Advances the queue clock and, if the policy is satisfied, removes
    /// the chosen entries and returns a request to start their match.
    fn tick(&mut self) -> Option<MatchRequest>;

    /// Snapshot of the waiting entries, oldest first.
    fn list_active(&self) -> Vec<QueueEntry>;

    fn contains(&self, player: PlayerId) -> bool;

    /// Number of waiting entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A queue driven by admission policy `P`.
pub struct Queue<P: AdmissionPolicy> {
    id: QueueId,
    policy: P,
    context: MatchContext,
    loadout: Loadout,
    arenas: ArenaPool,
    waiting: Vec<QueueEntry>,
    now: u64,
}

impl<P: AdmissionPolicy> Queue<P> {
    pub fn new(
        id: QueueId,
        policy: P,
        context: MatchContext,
        loadout: Loadout,
        arenas: ArenaPool,
    ) -> Self {
        Self {
            id,
            policy,
            context,
            loadout,
            arenas,
            waiting: Vec::new(),
            now: 0,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn arenas(&self) -> &ArenaPool {
        &self.arenas
    }

    pub fn arenas_mut(&mut self) -> &mut ArenaPool {
        &mut self.arenas
    }

    fn check_request(&self, request: &QueueRequest) -> Result<(), QueueError> {
        if request.requesters.is_empty() {
            return Err(QueueError::EmptyRequest);
        }
        let mut seen = HashSet::new();
        for &player in &request.requesters {
            if !seen.insert(player) {
                return Err(QueueError::DuplicateRequester(player));
            }
            if self.contains(player) {
                return Err(QueueError::AlreadyQueued(player));
            }
        }
        if let Some(requested) = &request.mode {
            if *requested != self.context.mode {
                return Err(QueueError::ModeMismatch {
                    mode: self.context.mode.clone(),
                    requested: requested.clone(),
                });
            }
        }
        self.policy.validate(request)
    }
}

impl<P: AdmissionPolicy> MatchQueue for Queue<P> {
    fn id(&self) -> QueueId {
        self.id
    }

    fn context(&self) -> &MatchContext {
        &self.context
    }

    fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    fn enqueue(&mut self, request: QueueRequest) -> Result<(), QueueError> {
        self.check_request(&request)?;
        debug!(
            queue_id = %self.id,
            size = request.requesters.len(),
            "request queued"
        );
        self.waiting.push(QueueEntry::new(request, self.now));
        Ok(())
    }

    fn dequeue(&mut self, player: PlayerId) -> Vec<PlayerId> {
        match self.waiting.iter().position(|e| e.contains(player)) {
            Some(index) => {
                let entry = self.waiting.remove(index);
                debug!(queue_id = %self.id, %player, "request withdrawn");
                entry.requesters
            }
            None => Vec::new(),
        }
    }

    fn tick(&mut self) -> Option<MatchRequest> {
        self.now += 1;
        let formation = self.policy.form(&self.waiting, self.now)?;

        let Some(arena) = self.arenas.choose(&mut rand::rng()) else {
            debug!(queue_id = %self.id, "no arena available, entries keep waiting");
            return None;
        };

        let teams: Vec<GameTeam> = formation
            .iter()
            .enumerate()
            .map(|(index, picks)| {
                GameTeam::new(
                    TeamColor::for_index(index),
                    picks
                        .iter()
                        .flat_map(|&i| self.waiting[i].requesters.iter().copied()),
                )
            })
            .collect();

        // Remove from the back so earlier indices stay valid.
        let picked: BTreeSet<usize> = formation.into_iter().flatten().collect();
        for &index in picked.iter().rev() {
            self.waiting.remove(index);
        }

        info!(
            queue_id = %self.id,
            policy = self.policy.name(),
            arena = %arena.name,
            teams = teams.len(),
            "match formed"
        );
        Some(MatchRequest {
            context: self.context.clone(),
            loadout: self.loadout.clone(),
            arena,
            origin: self.id,
            teams,
        })
    }

    fn list_active(&self) -> Vec<QueueEntry> {
        self.waiting.clone()
    }

    fn contains(&self, player: PlayerId) -> bool {
        self.waiting.iter().any(|e| e.contains(player))
    }

    fn len(&self) -> usize {
        self.waiting.len()
    }
}
