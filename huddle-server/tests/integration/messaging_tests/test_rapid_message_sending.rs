use crate::integration::{create_test_registry, init_tracing};
use crate::utils::{TestPeer, data, recv_roster};

#[tokio::test]
async fn test_rapid_message_sending() {
    init_tracing();

    let (registry, config) = create_test_registry();

    let mut alice = TestPeer::connect(&registry, "r1", "alice", &config);
    let mut bob = TestPeer::connect(&registry, "r1", "bob", &config);
    recv_roster(&mut bob).await.expect("bob: no init");

    let count = 200;
    for i in 0..count {
        alice.send_json(data(&format!("msg-{i}")));
    }

    // Per-sender order is preserved
    for i in 0..count {
        let received = bob.recv_type("data").await.expect("bob: missing message");
        assert_eq!(received["payload"]["message"], format!("msg-{i}"));
    }

    // Cleanup
    alice.disconnect();
    bob.disconnect();
    alice.finished().await.expect("alice: connection did not shut down");
    bob.finished().await.expect("bob: connection did not shut down");
}
