use crate::integration::{create_test_registry, init_tracing};
use crate::utils::{TestPeer, data, recv_from, recv_roster};

#[tokio::test]
async fn test_peer_leaves_others_stay() {
    init_tracing();

    let (registry, config) = create_test_registry();

    let mut alice = TestPeer::connect(&registry, "r1", "alice", &config);
    let mut bob = TestPeer::connect(&registry, "r1", "bob", &config);
    let mut carol = TestPeer::connect(&registry, "r1", "carol", &config);
    recv_roster(&mut alice).await.expect("alice: no init");
    alice.recv_type("client_joined").await.expect("alice: no client_joined");
    alice.recv_type("client_joined").await.expect("alice: no client_joined");
    recv_roster(&mut carol).await.expect("carol: no init");

    bob.disconnect();
    bob.finished().await.expect("bob: connection did not shut down");

    for peer in [&mut alice, &mut carol] {
        let left = recv_from(peer, "client_left").await.expect("No client_left");
        assert_eq!(left, bob.peer_id.to_string());
    }

    // The remaining pair still talks
    alice.send_json(data("still here"));
    let received = carol.recv_type("data").await.expect("carol: no data");
    assert_eq!(received["payload"]["message"], "still here");

    // A later joiner no longer sees bob
    let mut dave = TestPeer::connect(&registry, "r1", "dave", &config);
    let roster = recv_roster(&mut dave).await.expect("dave: no init");
    let names: Vec<_> = roster.iter().map(|(_, name)| name.as_str()).collect();
    assert_eq!(names, vec!["alice", "carol"]);

    // Cleanup
    for peer in [&mut alice, &mut carol, &mut dave] {
        peer.disconnect();
        peer.finished().await.expect("Connection did not shut down");
    }
}
