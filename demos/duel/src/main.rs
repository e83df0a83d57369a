//! Two players queue for a duel, one is eliminated, the match ends and the
//! arena is put back. Run with `RUST_LOG=debug` to see every step.

use std::time::Duration;

use skirmish::prelude::*;
use skirmish_protocol::RecordingHost;
use tokio::sync::mpsc;

const DUEL: QueueId = QueueId(1);

fn arena() -> Arena {
    Arena::new("canyon", Location::new(0.0, 80.0, 0.0)).with_spawns([
        Location::new(-20.0, 64.0, 0.0).facing(90.0, 0.0),
        Location::new(20.0, 64.0, 0.0).facing(-90.0, 0.0),
    ])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    skirmish::init_tracing();

    let alice = PlayerId(1);
    let bob = PlayerId(2);
    let wall = BlockPos::new(0, 65, 0);

    let mut host = RecordingHost::new();
    host.place(alice, Location::new(3.0, 64.0, 3.0));
    host.place(bob, Location::new(-3.0, 64.0, 3.0));

    let clock = TickConfig::default();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let orchestrator = OrchestratorBuilder::new()
        .match_config(MatchConfig {
            countdown_ticks: clock.ticks_for(Duration::from_secs(3)),
            ..MatchConfig::default()
        })
        .tick_config(clock)
        .queue(Queue::new(
            DUEL,
            DuelPolicy::one_v_one(),
            MatchContext::casual("1v1"),
            Loadout::new("sword"),
            ArenaPool::new([arena()]),
        ))
        .outcome_sink(outcome_tx)
        .build(host);

    let (handle, task) = skirmish::spawn(orchestrator);

    for player in [alice, bob] {
        handle.connect(player).await?;
        handle.enqueue(DUEL, QueueRequest::solo(player)).await?;
    }

    tokio::time::sleep(Duration::from_millis(3500)).await;

    let Some(Activity::Playing(match_id)) =
        handle.inspect(move |o| o.activity(alice)).await?
    else {
        return Err("duel did not start".into());
    };

    // Bob builds a wall, then takes Alice out.
    handle
        .inspect(move |o| o.host_mut().set_cell(wall, "cobblestone"))
        .await?;
    handle.block_changed(match_id, wall).await?;
    handle.eliminate(alice, Some(bob)).await?;

    if let Some(outcome) = outcome_rx.recv().await {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    // Settle after 1 s, teardown after 3 s.
    tokio::time::sleep(Duration::from_millis(3500)).await;

    handle.shutdown().await?;
    let orchestrator = task.await?;
    let host = orchestrator.host();

    tracing::info!(
        instructions = host.calls().len(),
        wall_restored = host.cell(wall).is_none(),
        alice = ?orchestrator.activity(alice),
        bob = ?orchestrator.activity(bob),
        "demo finished"
    );
    for line in host.messages_for(bob) {
        println!("bob saw: {line}");
    }
    Ok(())
}
