//! Admission policies: when a queue has enough to start a match, and how
//! the waiting entries split into teams.

use serde::{Deserialize, Serialize};

use crate::{QueueEntry, QueueError, QueueRequest};

/// Entries chosen for one match, as indices into the waiting list.
/// One inner `Vec` per team, in team order.
pub type Formation = Vec<Vec<usize>>;

/// The strategy a [`Queue`](crate::Queue) is built with.
pub trait AdmissionPolicy: Send + 'static {
    /// Short name for logs and listings.
    fn name(&self) -> &'static str;

    /// Checks a request's shape before it is queued.
    fn validate(&self, request: &QueueRequest) -> Result<(), QueueError>;

    /// Picks entries for one match from `waiting` (oldest first), or
    /// `None` if the policy isn't satisfied yet.
    fn form(&self, waiting: &[QueueEntry], now: u64) -> Option<Formation>;
}

fn require_group(request: &QueueRequest, expected: usize) -> Result<(), QueueError> {
    let got = request.requesters.len();
    if got != expected {
        return Err(QueueError::GroupSize { expected, got });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// DuelPolicy
// ---------------------------------------------------------------------------

/// Solo players, first come first served, two teams of `team_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelPolicy {
    pub team_size: usize,
}

impl DuelPolicy {
    pub fn one_v_one() -> Self {
        Self { team_size: 1 }
    }
}

impl AdmissionPolicy for DuelPolicy {
    fn name(&self) -> &'static str {
        "duel"
    }

    fn validate(&self, request: &QueueRequest) -> Result<(), QueueError> {
        require_group(request, 1)
    }

    fn form(&self, waiting: &[QueueEntry], _now: u64) -> Option<Formation> {
        let size = self.team_size.max(1);
        if waiting.len() < size * 2 {
            return None;
        }
        Some(vec![(0..size).collect(), (size..size * 2).collect()])
    }
}

// ---------------------------------------------------------------------------
// RankedPolicy
// ---------------------------------------------------------------------------

/// Rated 1v1. Two players match when their ratings are within a band that
/// starts at `initial_band` and widens by `widen_by` every `widen_every_ticks`
/// the older of the two has waited, up to `max_band`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankedPolicy {
    pub initial_band: u32,
    pub widen_by: u32,
    pub widen_every_ticks: u64,
    pub max_band: u32,
}

impl Default for RankedPolicy {
    fn default() -> Self {
        Self {
            initial_band: 50,
            widen_by: 25,
            // 5 seconds at 20 Hz.
            widen_every_ticks: 100,
            max_band: 400,
        }
    }
}

impl RankedPolicy {
    /// The band an entry that has waited `waited` ticks accepts.
    pub fn band(&self, waited: u64) -> u32 {
        let steps = waited / self.widen_every_ticks.max(1);
        let widened = u64::from(self.initial_band)
            + u64::from(self.widen_by).saturating_mul(steps);
        widened.min(u64::from(self.max_band)) as u32
    }
}

impl AdmissionPolicy for RankedPolicy {
    fn name(&self) -> &'static str {
        "ranked"
    }

    fn validate(&self, request: &QueueRequest) -> Result<(), QueueError> {
        require_group(request, 1)?;
        if request.rating.is_none() {
            return Err(QueueError::MissingRating(request.requesters[0]));
        }
        Ok(())
    }

    fn form(&self, waiting: &[QueueEntry], now: u64) -> Option<Formation> {
        for (i, older) in waiting.iter().enumerate() {
            let Some(a) = older.rating else { continue };
            let band = self.band(older.waited(now));
            let partner = waiting
                .iter()
                .enumerate()
                .skip(i + 1)
                .find(|(_, e)| e.rating.is_some_and(|b| a.abs_diff(b) <= band));
            if let Some((j, _)) = partner {
                return Some(vec![vec![i], vec![j]]);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// PartyPolicy
// ---------------------------------------------------------------------------

/// Two pre-formed parties of exactly `party_size` face each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyPolicy {
    pub party_size: usize,
}

impl AdmissionPolicy for PartyPolicy {
    fn name(&self) -> &'static str {
        "party"
    }

    fn validate(&self, request: &QueueRequest) -> Result<(), QueueError> {
        require_group(request, self.party_size)
    }

    fn form(&self, waiting: &[QueueEntry], _now: u64) -> Option<Formation> {
        (waiting.len() >= 2).then(|| vec![vec![0], vec![1]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_protocol::PlayerId;

    fn entry(player: u64, rating: Option<u32>, at: u64) -> QueueEntry {
        QueueEntry {
            requesters: vec![PlayerId(player)],
            mode: None,
            rating,
            enqueued_tick: at,
        }
    }

    #[test]
    fn test_duel_policy_waits_for_two_full_teams() {
        let policy = DuelPolicy { team_size: 2 };
        let waiting: Vec<_> = (1..=3).map(|p| entry(p, None, 0)).collect();
        assert!(policy.form(&waiting, 0).is_none());

        let waiting: Vec<_> = (1..=5).map(|p| entry(p, None, 0)).collect();
        assert_eq!(policy.form(&waiting, 0), Some(vec![vec![0, 1], vec![2, 3]]));
    }

    #[test]
    fn test_duel_policy_rejects_party() {
        let request = QueueRequest::party([PlayerId(1), PlayerId(2)]);
        assert_eq!(
            DuelPolicy::one_v_one().validate(&request),
            Err(QueueError::GroupSize { expected: 1, got: 2 })
        );
    }

    #[test]
    fn test_ranked_band_widens_with_wait_up_to_max() {
        let policy = RankedPolicy::default();
        assert_eq!(policy.band(0), 50);
        assert_eq!(policy.band(99), 50);
        assert_eq!(policy.band(100), 75);
        assert_eq!(policy.band(1_000_000), 400);
    }

    #[test]
    fn test_ranked_policy_matches_within_band_only() {
        let policy = RankedPolicy::default();
        let waiting = vec![entry(1, Some(1000), 0), entry(2, Some(1200), 0)];
        assert!(policy.form(&waiting, 0).is_none());

        // After 8 widening steps the band is 250.
        assert_eq!(policy.form(&waiting, 800), Some(vec![vec![0], vec![1]]));
    }

    #[test]
    fn test_ranked_policy_skips_to_closer_pair() {
        let policy = RankedPolicy::default();
        let waiting = vec![
            entry(1, Some(2000), 0),
            entry(2, Some(1000), 0),
            entry(3, Some(1030), 0),
        ];
        assert_eq!(policy.form(&waiting, 0), Some(vec![vec![1], vec![2]]));
    }

    #[test]
    fn test_ranked_policy_requires_rating() {
        let request = QueueRequest::solo(PlayerId(4));
        assert_eq!(
            RankedPolicy::default().validate(&request),
            Err(QueueError::MissingRating(PlayerId(4)))
        );
    }

    #[test]
    fn test_ranked_policy_deserializes_partial_json() {
        let policy: RankedPolicy =
            serde_json::from_str(r#"{"initial_band": 100}"#).expect("valid json");
        assert_eq!(policy.initial_band, 100);
        assert_eq!(policy.max_band, 400);
    }

    #[test]
    fn test_party_policy_requires_exact_size() {
        let policy = PartyPolicy { party_size: 2 };
        assert!(policy.validate(&QueueRequest::party([PlayerId(1), PlayerId(2)])).is_ok());
        assert_eq!(
            policy.validate(&QueueRequest::solo(PlayerId(1))),
            Err(QueueError::GroupSize { expected: 2, got: 1 })
        );
    }
}
