use bytes::Bytes;

use huddle_server::Frame;

use crate::integration::{create_test_registry, init_tracing};
use crate::utils::{TestPeer, data, recv_roster};

#[tokio::test]
async fn test_peer_sends_binary_data() {
    init_tracing();

    let (registry, config) = create_test_registry();

    let mut alice = TestPeer::connect(&registry, "r1", "alice", &config);
    let mut bob = TestPeer::connect(&registry, "r1", "bob", &config);
    recv_roster(&mut bob).await.expect("bob: no init");

    // UTF-8 JSON in a binary frame is handled like text
    let frame = data("binary hello").to_string();
    alice.send_frame(Frame::Binary(Bytes::from(frame)));

    let received = bob.recv_type("data").await.expect("bob: no data");
    assert_eq!(received["payload"]["message"], "binary hello");

    // Non UTF-8 payloads are skipped without dropping the connection
    alice.send_frame(Frame::Binary(Bytes::from_static(&[0xff, 0xfe, 0x00])));
    alice.send_json(data("still connected"));

    let received = bob.recv_type("data").await.expect("bob: no data");
    assert_eq!(received["payload"]["message"], "still connected");

    // Cleanup
    alice.disconnect();
    bob.disconnect();
    alice.finished().await.expect("alice: connection did not shut down");
    bob.finished().await.expect("bob: connection did not shut down");
}
