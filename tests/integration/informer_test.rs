//! Integration tests for backend change events reaching informer channels.

mod helpers;

use infraview_core::InformerAction;
use infraview_core::operation::{DeleteInput, UpdateInput};

#[tokio::test]
async fn test_subscribed_create_reaches_add_channel() {
    let host = helpers::TestHost::new();
    host.informer
        .subscribe("events", "default", [InformerAction::Added])
        .unwrap();
    let mut added = host.informer.add_channel();

    host.provider
        .create("events", "default", helpers::event("e1", "Scheduled"))
        .await
        .unwrap();

    let msg = helpers::next_message(&mut added).await;
    assert_eq!(msg.action, InformerAction::Added);
    assert_eq!(msg.resource_id, "events");
    assert_eq!(msg.namespace_id, "default");
    assert_eq!(msg.payload.id, "e1");
    assert_eq!(msg.payload.data["reason"], "Scheduled");

    host.shutdown().await;
}

#[tokio::test]
async fn test_update_carries_old_and_new_data() {
    let host = helpers::TestHost::new();
    host.informer
        .subscribe("events", "default", [InformerAction::Updated])
        .unwrap();
    let mut updated = host.informer.update_channel();

    host.provider
        .create("events", "default", helpers::event("e1", "BackOff"))
        .await
        .unwrap();
    host.provider
        .update(
            "events",
            "default",
            UpdateInput {
                id: "e1".into(),
                input: helpers::event_body("BackOff", 2),
            },
        )
        .await
        .unwrap();

    let msg = helpers::next_message(&mut updated).await;
    assert_eq!(msg.payload.id, "e1");
    assert_eq!(msg.payload.old_data["count"], 1);
    assert_eq!(msg.payload.new_data["count"], 2);

    host.shutdown().await;
}

#[tokio::test]
async fn test_unsubscribed_pairs_are_filtered() {
    let host = helpers::TestHost::new();
    host.informer
        .subscribe("events", "watched", InformerAction::ALL)
        .unwrap();
    let mut added = host.informer.add_channel();
    let mut deleted = host.informer.delete_channel();

    host.provider
        .create("events", "other", helpers::event("noise", "Pulled"))
        .await
        .unwrap();
    host.provider
        .create("events", "watched", helpers::event("signal", "Pulled"))
        .await
        .unwrap();

    let msg = helpers::next_message(&mut added).await;
    assert_eq!(msg.payload.id, "signal");
    assert_eq!(msg.namespace_id, "watched");

    host.informer
        .unsubscribe("events", "watched", [InformerAction::Deleted])
        .unwrap();
    host.provider
        .delete("events", "watched", DeleteInput { id: "signal".into() })
        .await
        .unwrap();
    host.provider
        .create("events", "watched", helpers::event("after", "Pulled"))
        .await
        .unwrap();

    let msg = helpers::next_message(&mut added).await;
    assert_eq!(msg.payload.id, "after");
    assert!(deleted.try_recv().is_none());

    host.shutdown().await;
}

#[tokio::test]
async fn test_unsubscribe_all_on_disconnect() {
    let host = helpers::TestHost::new();
    host.informer
        .subscribe("events", "team-a", [InformerAction::Added])
        .unwrap();
    host.informer
        .subscribe("nodes", "team-a", [InformerAction::Added])
        .unwrap();
    host.informer
        .subscribe("events", "team-b", [InformerAction::Added])
        .unwrap();
    let mut added = host.informer.add_channel();

    host.informer.unsubscribe_all("team-a").unwrap();
    host.informer.unsubscribe_all("team-a").unwrap();

    host.provider
        .create("events", "team-a", helpers::event("dropped", "Pulled"))
        .await
        .unwrap();
    host.provider
        .create("events", "team-b", helpers::event("kept", "Pulled"))
        .await
        .unwrap();

    let msg = helpers::next_message(&mut added).await;
    assert_eq!(msg.payload.id, "kept");
    assert_eq!(host.informer.subscriptions().len(), 1);

    host.shutdown().await;
}

#[tokio::test]
async fn test_every_endpoint_receives_each_message() {
    let host = helpers::TestHost::new();
    host.informer
        .subscribe("events", "default", [InformerAction::Deleted])
        .unwrap();
    let mut first = host.informer.delete_channel();
    let mut second = host.informer.delete_channel();

    host.provider
        .create("events", "default", helpers::event("e1", "Killing"))
        .await
        .unwrap();
    host.provider
        .delete("events", "default", DeleteInput { id: "e1".into() })
        .await
        .unwrap();

    assert_eq!(helpers::next_message(&mut first).await.payload.id, "e1");
    assert_eq!(helpers::next_message(&mut second).await.payload.id, "e1");

    host.shutdown().await;
}

#[tokio::test]
async fn test_unread_channel_does_not_stall_dispatch() {
    let host = helpers::TestHost::new();
    host.informer
        .subscribe("events", "default", InformerAction::ALL)
        .unwrap();
    let mut stalled = host.informer.update_channel();
    let mut added = host.informer.add_channel();

    for i in 0..200 {
        let name = format!("e{i}");
        host.provider
            .create("events", "default", helpers::event(&name, "Pulled"))
            .await
            .unwrap();
        assert_eq!(helpers::next_message(&mut added).await.payload.id, name);

        host.provider
            .update(
                "events",
                "default",
                UpdateInput {
                    id: name,
                    input: helpers::event_body("Pulled", 2),
                },
            )
            .await
            .unwrap();
    }

    host.provider
        .create("events", "default", helpers::event("fence", "Pulled"))
        .await
        .unwrap();
    assert_eq!(helpers::next_message(&mut added).await.payload.id, "fence");

    // The update channel buffers 64 messages; the oldest 136 were dropped.
    assert_eq!(stalled.try_recv().unwrap().payload.id, "e136");
    assert_eq!(stalled.dropped(), 136);

    host.shutdown().await;
}
