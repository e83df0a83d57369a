//! Tests for the actor runtime on a paused Tokio clock.

use std::time::Duration;

use skirmish::prelude::*;
use skirmish_protocol::{HostCall, RecordingHost};
use tokio::sync::mpsc;

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn orchestrator(
    outcomes: mpsc::UnboundedSender<MatchOutcome>,
) -> Orchestrator<RecordingHost> {
    let mut host = RecordingHost::new();
    host.place(pid(1), Location::new(1.0, 64.0, 0.0));
    host.place(pid(2), Location::new(2.0, 64.0, 0.0));

    OrchestratorBuilder::new()
        .tick_config(TickConfig::with_rate(20))
        .match_config(MatchConfig {
            countdown_ticks: 20,
            teardown_delay_ticks: 60,
            time_limit_ticks: None,
            ..MatchConfig::default()
        })
        .queue(Queue::new(
            QueueId(1),
            DuelPolicy::one_v_one(),
            MatchContext::ranked("1v1"),
            Loadout::new("sword"),
            ArenaPool::new([Arena::new("canyon", Location::new(0.0, 80.0, 0.0))]),
        ))
        .outcome_sink(outcomes)
        .build(host)
}

#[tokio::test(start_paused = true)]
async fn test_runtime_runs_duel_on_its_clock() {
    let (tx, mut outcomes) = mpsc::unbounded_channel();
    let (handle, task) = spawn(orchestrator(tx));

    handle.connect(pid(1)).await.expect("fresh");
    handle.connect(pid(2)).await.expect("fresh");
    handle
        .enqueue(QueueId(1), QueueRequest::solo(pid(1)))
        .await
        .expect("idle");
    handle
        .enqueue(QueueId(1), QueueRequest::solo(pid(2)))
        .await
        .expect("idle");

    // Countdown is 20 ticks at 20 Hz.
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let state = handle
        .inspect(|o| o.matches().first().map(|m| m.state))
        .await
        .expect("running");
    assert_eq!(state, Some(MatchState::Active));

    let match_id = handle.eliminate(pid(1), Some(pid(2))).await.expect("active");
    let outcome = outcomes.recv().await.expect("outcome delivered");
    assert_eq!(outcome.match_id, match_id);
    assert_eq!(outcome.winner, Some(TeamColor::Blue));

    // Teardown is 60 ticks later.
    tokio::time::sleep(Duration::from_secs(4)).await;

    let (running, activity) = handle
        .inspect(|o| (o.matches().len(), o.activity(pid(1))))
        .await
        .expect("running");
    assert_eq!(running, 0);
    assert_eq!(activity, Some(Activity::Idle));

    handle.shutdown().await.expect("running");
    let orchestrator = task.await.expect("actor finished");
    let settled = orchestrator
        .host()
        .calls()
        .iter()
        .any(|call| matches!(call, HostCall::ClearModifiers { player } if *player == pid(1)));
    assert!(settled, "modifiers cleared for the eliminated player");
}

#[tokio::test(start_paused = true)]
async fn test_handle_after_shutdown_is_unavailable() {
    let (tx, _outcomes) = mpsc::unbounded_channel();
    let (handle, task) = spawn(orchestrator(tx));

    handle.shutdown().await.expect("running");
    task.await.expect("actor finished");

    let result = handle.connect(pid(1)).await;
    assert!(matches!(result, Err(SkirmishError::Unavailable)));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_every_handle_stops_actor() {
    let (tx, _outcomes) = mpsc::unbounded_channel();
    let (handle, task) = spawn(orchestrator(tx));
    let second = handle.clone();

    second.connect(pid(1)).await.expect("fresh");
    drop(handle);
    drop(second);

    let orchestrator = task.await.expect("actor finished");
    assert_eq!(orchestrator.activity(pid(1)), Some(Activity::Idle));
}

#[tokio::test(start_paused = true)]
async fn test_errors_cross_the_channel() {
    let (tx, _outcomes) = mpsc::unbounded_channel();
    let (handle, _task) = spawn(orchestrator(tx));

    handle.connect(pid(1)).await.expect("fresh");
    let result = handle.connect(pid(1)).await;
    assert!(matches!(result, Err(SkirmishError::Session(_))));

    let result = handle.abort(MatchId(7)).await;
    assert!(matches!(result, Err(SkirmishError::Match(_))));
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_countdown_until_resume() {
    let (tx, _outcomes) = mpsc::unbounded_channel();
    let (handle, _task) = spawn(orchestrator(tx));
    for player in [pid(1), pid(2)] {
        handle.connect(player).await.expect("fresh");
        handle
            .enqueue(QueueId(1), QueueRequest::solo(player))
            .await
            .expect("idle");
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    handle.pause().await.expect("running");
    tokio::time::sleep(Duration::from_secs(5)).await;
    let state = handle
        .inspect(|o| o.matches().first().map(|m| m.state))
        .await
        .expect("running");
    assert_eq!(state, Some(MatchState::Starting), "frozen mid countdown");

    handle.resume().await.expect("running");
    tokio::time::sleep(Duration::from_secs(2)).await;
    let state = handle
        .inspect(|o| o.matches().first().map(|m| m.state))
        .await
        .expect("running");
    assert_eq!(state, Some(MatchState::Active));
}
