//! The session manager: tracks every known player session.
//!
//! # Concurrency note
//!
//! `SessionManager` is a plain `HashMap` wrapper with `&mut self`
//! methods. It is owned by the single match authority, so it needs no
//! locking of its own.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use skirmish_protocol::PlayerId;

use crate::{
    Activity, ConnectionState, PlayerSession, SessionConfig, SessionError,
};

/// Registry of player sessions.
///
/// ```text
/// connect() ──→ disconnect() ──→ reconnect()
///     │               │
///     │               ▼
///     │          expire_stale() ──→ cleanup_expired()
///     ▼
/// begin(Queued) ──→ set_activity(Playing) ──→ release() (back to Idle)
/// ```
pub struct SessionManager {
    sessions: HashMap<PlayerId, PlayerSession>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// Creates a session for a newly connected player.
    ///
    /// A disconnected or expired session is replaced by a fresh idle one.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the player is already connected.
    pub fn connect(
        &mut self,
        player_id: PlayerId,
    ) -> Result<&PlayerSession, SessionError> {
        if let Some(existing) = self.sessions.get(&player_id) {
            if existing.is_connected() {
                return Err(SessionError::AlreadyConnected(player_id));
            }
        }

        tracing::info!(%player_id, "session created");
        let session = self
            .sessions
            .entry(player_id)
            .insert_entry(PlayerSession {
                player_id,
                connection: ConnectionState::Connected,
                activity: Activity::Idle,
            })
            .into_mut();
        Ok(&*session)
    }

    /// Marks a player as disconnected and starts the grace period.
    ///
    /// Returns the activity the player had, so the caller can pull them
    /// out of their queue or match.
    pub fn disconnect(
        &mut self,
        player_id: PlayerId,
    ) -> Result<Activity, SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;

        session.connection = ConnectionState::Disconnected {
            since: Instant::now(),
        };
        tracing::info!(
            %player_id,
            activity = %session.activity,
            "player disconnected, grace period started"
        );
        Ok(session.activity)
    }

    /// Brings a disconnected player back within the grace period.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]: never connected or already cleaned up
    /// - [`SessionError::AlreadyConnected`]: nothing to resume
    /// - [`SessionError::SessionExpired`]: grace period elapsed
    pub fn reconnect(
        &mut self,
        player_id: PlayerId,
    ) -> Result<&PlayerSession, SessionError> {
        let grace = Duration::from_secs(self.config.reconnect_grace_secs);
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;

        match session.connection {
            ConnectionState::Connected => {
                Err(SessionError::AlreadyConnected(player_id))
            }
            ConnectionState::Expired => {
                Err(SessionError::SessionExpired(player_id))
            }
            ConnectionState::Disconnected { since } => {
                if since.elapsed() > grace {
                    session.connection = ConnectionState::Expired;
                    return Err(SessionError::SessionExpired(player_id));
                }
                session.connection = ConnectionState::Connected;
                tracing::info!(%player_id, "player reconnected");
                Ok(&*session)
            }
        }
    }

    /// Expires every disconnected session past its grace period.
    /// Returns the expired player ids.
    pub fn expire_stale(&mut self) -> Vec<PlayerId> {
        let grace = Duration::from_secs(self.config.reconnect_grace_secs);
        let mut expired = Vec::new();

        for session in self.sessions.values_mut() {
            if let ConnectionState::Disconnected { since } = session.connection
            {
                if since.elapsed() > grace {
                    session.connection = ConnectionState::Expired;
                    expired.push(session.player_id);
                    tracing::info!(
                        player_id = %session.player_id,
                        "session expired (grace period elapsed)"
                    );
                }
            }
        }

        expired.sort();
        expired
    }

    /// Removes expired sessions.
    pub fn cleanup_expired(&mut self) {
        self.sessions.retain(|_, session| {
            !matches!(session.connection, ConnectionState::Expired)
        });
    }

    /// Moves an idle, connected player into `activity`.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] / [`SessionError::NotConnected`]
    /// - [`SessionError::Busy`] if the player isn't idle
    pub fn begin(
        &mut self,
        player_id: PlayerId,
        activity: Activity,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        if !session.is_connected() {
            return Err(SessionError::NotConnected(player_id));
        }
        if !session.activity.is_idle() {
            return Err(SessionError::Busy {
                player: player_id,
                activity: session.activity,
            });
        }
        session.activity = activity;
        Ok(())
    }

    /// Overwrites a player's activity. Unknown players are ignored.
    ///
    /// Used for transitions the core has already validated, e.g. queued →
    /// playing on admission or playing → spectating on elimination.
    pub fn set_activity(&mut self, player_id: PlayerId, activity: Activity) {
        if let Some(session) = self.sessions.get_mut(&player_id) {
            tracing::debug!(%player_id, %activity, "activity changed");
            session.activity = activity;
        }
    }

    /// Returns a player to `Idle`. Unknown players are ignored.
    pub fn release(&mut self, player_id: PlayerId) {
        self.set_activity(player_id, Activity::Idle);
    }

    pub fn activity(&self, player_id: &PlayerId) -> Option<Activity> {
        self.sessions.get(player_id).map(|s| s.activity)
    }

    pub fn is_online(&self, player_id: &PlayerId) -> bool {
        self.sessions
            .get(player_id)
            .is_some_and(PlayerSession::is_connected)
    }

    /// Every connected player, sorted by id.
    pub fn online(&self) -> Vec<PlayerId> {
        let mut online: Vec<PlayerId> = self
            .sessions
            .values()
            .filter(|s| s.is_connected())
            .map(|s| s.player_id)
            .collect();
        online.sort();
        online
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&PlayerSession> {
        self.sessions.get(player_id)
    }

    /// Number of sessions in any state.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Time-dependent behavior uses two configs instead of sleeping:
    //!   - `reconnect_grace_secs: 0` → disconnected sessions expire at once
    //!   - `reconnect_grace_secs: 3600` → they never expire during a test

    use skirmish_protocol::{MatchId, QueueId};

    use super::*;

    fn manager_with_instant_expiry() -> SessionManager {
        SessionManager::new(SessionConfig {
            reconnect_grace_secs: 0,
        })
    }

    fn manager_with_long_grace() -> SessionManager {
        SessionManager::new(SessionConfig {
            reconnect_grace_secs: 3600,
        })
    }

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    // =====================================================================
    // connect()
    // =====================================================================

    #[test]
    fn test_connect_new_player_is_connected_and_idle() {
        let mut mgr = manager_with_long_grace();

        let session = mgr.connect(pid(1)).expect("should succeed");

        assert!(session.is_connected());
        assert_eq!(session.activity, Activity::Idle);
    }

    #[test]
    fn test_connect_already_connected_returns_error() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();

        let result = mgr.connect(pid(1));

        assert!(matches!(result, Err(SessionError::AlreadyConnected(p)) if p == pid(1)));
    }

    #[test]
    fn test_connect_replaces_disconnected_session_with_idle_one() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();
        mgr.begin(pid(1), Activity::Queued(QueueId(1))).unwrap();
        mgr.disconnect(pid(1)).unwrap();

        let session = mgr.connect(pid(1)).expect("should replace");

        assert!(session.is_connected());
        assert!(session.activity.is_idle());
    }

    // =====================================================================
    // disconnect() / reconnect()
    // =====================================================================

    #[test]
    fn test_disconnect_returns_previous_activity() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();
        mgr.begin(pid(1), Activity::Playing(MatchId(9))).unwrap();

        let activity = mgr.disconnect(pid(1)).unwrap();

        assert_eq!(activity, Activity::Playing(MatchId(9)));
        assert!(!mgr.is_online(&pid(1)));
    }

    #[test]
    fn test_disconnect_unknown_player_returns_not_found() {
        let mut mgr = manager_with_long_grace();
        assert_eq!(mgr.disconnect(pid(99)), Err(SessionError::NotFound(pid(99))));
    }

    #[test]
    fn test_reconnect_within_grace_restores_connected() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();
        mgr.disconnect(pid(1)).unwrap();

        let session = mgr.reconnect(pid(1)).expect("should succeed");

        assert!(session.is_connected());
    }

    #[test]
    fn test_reconnect_after_grace_returns_expired() {
        let mut mgr = manager_with_instant_expiry();
        mgr.connect(pid(1)).unwrap();
        mgr.disconnect(pid(1)).unwrap();
        std::thread::sleep(Duration::from_millis(2));

        let result = mgr.reconnect(pid(1));

        assert!(matches!(result, Err(SessionError::SessionExpired(p)) if p == pid(1)));
    }

    #[test]
    fn test_reconnect_connected_player_returns_error() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();

        assert!(matches!(
            mgr.reconnect(pid(1)),
            Err(SessionError::AlreadyConnected(_))
        ));
    }

    // =====================================================================
    // expire_stale() / cleanup_expired()
    // =====================================================================

    #[test]
    fn test_expire_then_cleanup_removes_only_expired() {
        let mut mgr = manager_with_instant_expiry();
        mgr.connect(pid(1)).unwrap();
        mgr.connect(pid(2)).unwrap();
        mgr.disconnect(pid(1)).unwrap();
        std::thread::sleep(Duration::from_millis(2));

        assert_eq!(mgr.expire_stale(), vec![pid(1)]);
        mgr.cleanup_expired();

        assert_eq!(mgr.len(), 1);
        assert!(mgr.get(&pid(1)).is_none());
        assert!(mgr.get(&pid(2)).is_some());
    }

    #[test]
    fn test_expire_stale_skips_sessions_within_grace() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();
        mgr.disconnect(pid(1)).unwrap();

        assert!(mgr.expire_stale().is_empty());
    }

    // =====================================================================
    // Activity
    // =====================================================================

    #[test]
    fn test_begin_idle_player_sets_activity() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();

        mgr.begin(pid(1), Activity::Queued(QueueId(2))).unwrap();

        assert_eq!(mgr.activity(&pid(1)), Some(Activity::Queued(QueueId(2))));
    }

    #[test]
    fn test_begin_busy_player_is_rejected() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();
        mgr.begin(pid(1), Activity::Queued(QueueId(2))).unwrap();

        let result = mgr.begin(pid(1), Activity::Queued(QueueId(3)));

        assert_eq!(
            result,
            Err(SessionError::Busy {
                player: pid(1),
                activity: Activity::Queued(QueueId(2)),
            })
        );
    }

    #[test]
    fn test_begin_offline_player_is_rejected() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();
        mgr.disconnect(pid(1)).unwrap();

        assert_eq!(
            mgr.begin(pid(1), Activity::Queued(QueueId(1))),
            Err(SessionError::NotConnected(pid(1)))
        );
    }

    #[test]
    fn test_release_returns_player_to_idle() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(1)).unwrap();
        mgr.begin(pid(1), Activity::Playing(MatchId(1))).unwrap();
        mgr.set_activity(pid(1), Activity::Spectating(MatchId(1)));

        mgr.release(pid(1));

        assert_eq!(mgr.activity(&pid(1)), Some(Activity::Idle));
        mgr.release(pid(42)); // unknown: no-op
    }

    #[test]
    fn test_online_lists_connected_players_sorted() {
        let mut mgr = manager_with_long_grace();
        mgr.connect(pid(3)).unwrap();
        mgr.connect(pid(1)).unwrap();
        mgr.connect(pid(2)).unwrap();
        mgr.disconnect(pid(2)).unwrap();

        assert_eq!(mgr.online(), vec![pid(1), pid(3)]);
    }

    #[test]
    fn test_activity_display() {
        assert_eq!(Activity::Idle.to_string(), "idle");
        assert_eq!(Activity::Spectating(MatchId(4)).to_string(), "spectating M-4");
    }
}
