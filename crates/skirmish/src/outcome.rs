//! Where decided match results go.

use skirmish_match::MatchOutcome;
use tokio::sync::mpsc;

/// Receives every match outcome the orchestrator decides, once each.
///
/// Reward computation, rating updates and persistence live behind this
/// trait. It runs on the tick authority, so implementations should hand
/// work off rather than block.
pub trait OutcomeSink: Send {
    fn record(&mut self, outcome: &MatchOutcome);
}

/// Logs outcomes and does nothing else. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOutcomes;

impl OutcomeSink for LogOutcomes {
    fn record(&mut self, outcome: &MatchOutcome) {
        tracing::info!(
            match_id = %outcome.match_id,
            winner = ?outcome.winner,
            reason = %outcome.reason,
            duration_ticks = outcome.duration_ticks,
            "match outcome"
        );
    }
}

/// Forwards outcomes to another task.
impl OutcomeSink for mpsc::UnboundedSender<MatchOutcome> {
    fn record(&mut self, outcome: &MatchOutcome) {
        if self.send(outcome.clone()).is_err() {
            tracing::debug!(
                match_id = %outcome.match_id,
                "outcome receiver dropped"
            );
        }
    }
}

impl<F> OutcomeSink for F
where
    F: FnMut(&MatchOutcome) + Send,
{
    fn record(&mut self, outcome: &MatchOutcome) {
        self(outcome)
    }
}
