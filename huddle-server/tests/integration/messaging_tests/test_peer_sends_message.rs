use serde_json::json;

use crate::integration::{create_test_registry, init_tracing};
use crate::utils::{TestPeer, data, recv_roster};

#[tokio::test]
async fn test_peer_sends_message() {
    init_tracing();

    let (registry, config) = create_test_registry();

    let mut alice = TestPeer::connect(&registry, "r1", "alice", &config);
    let mut bob = TestPeer::connect(&registry, "r1", "bob", &config);
    let mut carol = TestPeer::connect(&registry, "r1", "carol", &config);
    recv_roster(&mut alice).await.expect("alice: no init");
    alice.recv_type("client_joined").await.expect("alice: no client_joined");
    alice.recv_type("client_joined").await.expect("alice: no client_joined");
    recv_roster(&mut bob).await.expect("bob: no init");
    bob.recv_type("client_joined").await.expect("bob: no client_joined");
    recv_roster(&mut carol).await.expect("carol: no init");

    // Extra fields survive the relay byte-for-byte
    let payload = json!({"message": "Hello, Room!", "meta": {"lang": "en", "n": [1, 2]}});
    alice.send_json(json!({"type": "data", "payload": payload}));

    for peer in [&mut bob, &mut carol] {
        let received = peer.recv_type("data").await.expect("No data message");
        assert_eq!(received["payload"], payload);
    }

    // The sender does not get its own broadcast
    bob.send_json(data("from bob"));
    let next = alice.recv().await.expect("alice: no data");
    assert_eq!(next["payload"]["message"], "from bob");

    // Cleanup
    for peer in [&mut alice, &mut bob, &mut carol] {
        peer.disconnect();
        peer.finished().await.expect("Connection did not shut down");
    }
}
