use serde_json::json;

use crate::integration::{create_test_registry, init_tracing};
use crate::utils::{TestPeer, data, recv_roster};

#[tokio::test]
async fn test_invalid_frames_are_ignored() {
    init_tracing();

    let (registry, config) = create_test_registry();

    let mut alice = TestPeer::connect(&registry, "r1", "alice", &config);
    let mut bob = TestPeer::connect(&registry, "r1", "bob", &config);
    recv_roster(&mut alice).await.expect("alice: no init");
    alice.recv_type("client_joined").await.expect("alice: no client_joined");
    recv_roster(&mut bob).await.expect("bob: no init");

    alice.send_json(json!({"type": "bogus", "payload": {}}));
    alice.send_raw("definitely not json");
    alice.send_json(json!({"payload": {"message": "no type"}}));
    alice.send_json(json!({"type": "offer", "payload": {"messageId": "m1"}}));
    alice.send_json(json!({"type": "data", "payload": {"text": "missing message"}}));
    alice.send_json(json!({"type": "streamMetadata", "payload": {"streamId": "s", "streamType": "hologram"}}));
    alice.send_json(data("after"));

    // None of the bad frames produced output; the good one did
    let next = bob.recv().await.expect("bob: no data");
    assert_eq!(next["type"], "data");
    assert_eq!(next["payload"]["message"], "after");

    // alice got nothing back and is still a member
    bob.send_json(data("reply"));
    let reply = alice.recv().await.expect("alice: no reply");
    assert_eq!(reply["payload"]["message"], "reply");
    assert_eq!(registry.participant_count(&"r1".into()), Some(2));

    // Cleanup
    alice.disconnect();
    bob.disconnect();
    alice.finished().await.expect("alice: connection did not shut down");
    bob.finished().await.expect("bob: connection did not shut down");
}
