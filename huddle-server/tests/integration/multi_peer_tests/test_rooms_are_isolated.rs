use crate::integration::{create_test_registry, init_tracing};
use crate::utils::{TestPeer, data, offer_to, recv_roster};

#[tokio::test]
async fn test_rooms_are_isolated() {
    init_tracing();

    let (registry, config) = create_test_registry();

    let mut alice = TestPeer::connect(&registry, "r1", "alice", &config);
    let mut bob = TestPeer::connect(&registry, "r2", "bob", &config);
    let mut carol = TestPeer::connect(&registry, "r2", "carol", &config);

    // Separate rooms, separate rosters
    assert!(recv_roster(&mut alice).await.expect("alice: no init").is_empty());
    assert!(recv_roster(&mut bob).await.expect("bob: no init").is_empty());
    bob.recv_type("client_joined").await.expect("bob: no client_joined");

    // Neither a broadcast nor a cross-room unicast leaks
    alice.send_json(data("r1 only"));
    alice.send_json(offer_to(&bob.peer_id, "m1"));
    carol.send_json(data("r2 only"));

    let next = bob.recv().await.expect("bob: no data");
    assert_eq!(next["type"], "data");
    assert_eq!(next["payload"]["message"], "r2 only");

    assert_eq!(registry.len(), 2);

    // Cleanup
    for peer in [&mut alice, &mut bob, &mut carol] {
        peer.disconnect();
        peer.finished().await.expect("Connection did not shut down");
    }
    assert!(registry.is_empty());
}
