//! Queues feeding the match manager.

use skirmish_match::{Arena, Loadout, MatchConfig, MatchContext, MatchManager, MatchState};
use skirmish_protocol::{Location, PlayerId, QueueId, RecordingHost};
use skirmish_queue::{
    ArenaPool, DuelPolicy, MatchQueue, PartyPolicy, Queue, QueueRequest, RankedPolicy,
};

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn pool() -> ArenaPool {
    ArenaPool::new([
        Arena::new("canyon", Location::new(0.0, 80.0, 0.0))
            .with_spawns([Location::new(-20.0, 64.0, 0.0), Location::new(20.0, 64.0, 0.0)]),
    ])
}

#[test]
fn test_queues_of_different_policies_share_one_interface() {
    let mut queues: Vec<Box<dyn MatchQueue>> = vec![
        Box::new(Queue::new(
            QueueId(1),
            DuelPolicy::one_v_one(),
            MatchContext::casual("1v1"),
            Loadout::new("sword"),
            pool(),
        )),
        Box::new(Queue::new(
            QueueId(2),
            RankedPolicy::default(),
            MatchContext::ranked("1v1"),
            Loadout::new("sword"),
            pool(),
        )),
        Box::new(Queue::new(
            QueueId(3),
            PartyPolicy { party_size: 2 },
            MatchContext::casual("2v2"),
            Loadout::new("bow"),
            pool(),
        )),
    ];

    queues[0].enqueue(QueueRequest::solo(pid(1))).expect("solo");
    queues[1]
        .enqueue(QueueRequest::solo(pid(2)).with_rating(1500))
        .expect("rated");
    queues[2]
        .enqueue(QueueRequest::party([pid(3), pid(4)]))
        .expect("party");

    let names: Vec<_> = queues.iter().map(|q| q.policy_name()).collect();
    assert_eq!(names, vec!["duel", "ranked", "party"]);
    assert!(queues.iter().all(|q| q.len() == 1));
    assert!(queues.iter_mut().all(|q| q.tick().is_none()));
}

#[test]
fn test_formed_request_starts_a_match() {
    let mut host = RecordingHost::new();
    let mut manager = MatchManager::new(MatchConfig::default());
    let mut queue = Queue::new(
        QueueId(7),
        PartyPolicy { party_size: 2 },
        MatchContext::casual("2v2"),
        Loadout::new("bow"),
        pool(),
    );
    queue
        .enqueue(QueueRequest::party([pid(1), pid(2)]))
        .expect("party");
    queue
        .enqueue(QueueRequest::party([pid(3), pid(4)]))
        .expect("party");

    let request = queue.tick().expect("two parties");
    let id = manager.create_match(request, &mut host).expect("free players");

    let session = manager.get(id).expect("created");
    assert_eq!(session.state(), MatchState::Starting);
    assert_eq!(session.origin(), QueueId(7));
    assert_eq!(session.everyone(), vec![pid(1), pid(2), pid(3), pid(4)]);
    assert_eq!(
        session.find_opposing_team(pid(1)).map(|t| t.contains(pid(3))),
        Some(true)
    );
    assert!(queue.list_active().is_empty());
}

#[test]
fn test_ranked_queue_pairs_after_band_widens() {
    let mut queue = Queue::new(
        QueueId(2),
        RankedPolicy {
            initial_band: 50,
            widen_by: 50,
            widen_every_ticks: 10,
            max_band: 500,
        },
        MatchContext::ranked("1v1"),
        Loadout::new("sword"),
        pool(),
    );
    queue
        .enqueue(QueueRequest::solo(pid(1)).with_rating(1000))
        .expect("rated");
    queue
        .enqueue(QueueRequest::solo(pid(2)).with_rating(1180))
        .expect("rated");

    let mut formed_at = None;
    for tick in 1..=100 {
        if let Some(request) = queue.tick() {
            assert_eq!(request.teams.len(), 2);
            assert!(request.context.ranked);
            formed_at = Some(tick);
            break;
        }
    }

    // Band reaches 200 after 30 ticks of waiting.
    assert_eq!(formed_at, Some(30));
}
