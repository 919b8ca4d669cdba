use std::collections::BTreeSet;

use crate::integration::{create_test_registry, init_tracing};
use crate::utils::{TestPeer, recv_roster};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins() {
    init_tracing();

    let (registry, config) = create_test_registry();
    let count = 16;

    let handles: Vec<_> = (0..count)
        .map(|i| {
            let registry = registry.clone();
            let config = config.clone();
            tokio::spawn(async move {
                TestPeer::connect(&registry, "shared", &format!("peer-{i}"), &config)
            })
        })
        .collect();

    let mut peers = Vec::new();
    for handle in handles {
        peers.push(handle.await.expect("Join task panicked"));
    }

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.participant_count(&"shared".into()), Some(count));

    // Joins are serialized: each peer saw a different number of predecessors
    let mut roster_sizes = BTreeSet::new();
    for peer in &mut peers {
        let roster = recv_roster(peer).await.expect("No init");
        roster_sizes.insert(roster.len());
    }
    assert_eq!(roster_sizes, (0..count).collect::<BTreeSet<_>>());

    // Cleanup
    for peer in &mut peers {
        peer.disconnect();
    }
    for peer in &mut peers {
        peer.finished().await.expect("Connection did not shut down");
    }
    assert!(registry.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_churn_on_one_room_never_strands_a_peer() {
    init_tracing();

    let (registry, config) = create_test_registry();

    // Repeatedly empty and refill the room while new peers are admitted
    for round in 0..20 {
        let mut first = TestPeer::connect(&registry, "churn", &format!("a-{round}"), &config);
        let leaving = tokio::spawn(async move {
            first.disconnect();
            first.finished().await
        });

        let mut second = TestPeer::connect(&registry, "churn", &format!("b-{round}"), &config);
        leaving
            .await
            .expect("Leave task panicked")
            .expect("Connection did not shut down");

        // Whatever the interleaving, the newcomer sits in the registered room
        let room = registry.get(&"churn".into()).expect("Room should exist");
        assert!(room.contains(second.peer_id));

        second.disconnect();
        second.finished().await.expect("Connection did not shut down");
        assert!(registry.get(&"churn".into()).is_none());
    }
}
