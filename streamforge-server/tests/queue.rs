//! Alert queue invariants (spec.md §8 properties 1-5), driven against a
//! real repository backed by an in-memory store and a real `Hub` with no
//! connected clients (the fallback timer is the only consumer).

use std::time::Duration;

use streamforge_core::{EventType, NewAlert, TriggerFacts};
use streamforge_server::hub::Hub;
use streamforge_server::queue::AlertQueue;
use streamforge_server::repository::ConfigRepository;
use streamforge_server::store::Store;

async fn setup() -> ConfigRepository {
    let store = Store::open_in_memory().await.unwrap();
    let repo = ConfigRepository::new(store);
    repo.create_alert(NewAlert {
        event_type: EventType::Follow,
        duration_ms: Some(1_000),
        ..Default::default()
    })
    .await
    .unwrap();
    repo
}

fn follow_facts(username: &str) -> TriggerFacts {
    TriggerFacts {
        event_type: Some(EventType::Follow),
        username: Some(username.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn enqueue_without_required_fields_is_rejected() {
    let repo = setup().await;
    let hub = Hub::new();
    let (handle, _join) = AlertQueue::spawn(repo, hub);

    let result = handle.enqueue(TriggerFacts::default()).await;
    assert!(result.is_err());
    assert_eq!(handle.length().await, 0);
}

#[tokio::test]
async fn complete_with_mismatched_id_is_a_noop() {
    let repo = setup().await;
    let hub = Hub::new();
    let (handle, _join) = AlertQueue::spawn(repo, hub);

    handle.enqueue(follow_facts("alice")).await.unwrap();
    handle.enqueue(follow_facts("bob")).await.unwrap();
    // "alice" became current immediately (consumer was idle); "bob" sits
    // in the pending queue.
    assert_eq!(handle.length().await, 1);

    handle.complete(Some(uuid::Uuid::new_v4())).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Stale ack changed nothing: still one pending, current still in flight.
    assert_eq!(handle.length().await, 1);
}

#[tokio::test]
async fn clear_empties_pending_queue_without_touching_current() {
    let repo = setup().await;
    let hub = Hub::new();
    let (handle, _join) = AlertQueue::spawn(repo, hub);

    let first = handle.enqueue(follow_facts("alice")).await.unwrap();
    handle.enqueue(follow_facts("bob")).await.unwrap();
    handle.enqueue(follow_facts("carol")).await.unwrap();
    assert!(first.is_some());
    assert_eq!(handle.length().await, 2);

    let cleared = handle.clear().await;
    assert_eq!(cleared, 2);
    assert_eq!(handle.length().await, 0);
}

#[tokio::test]
async fn every_enqueued_instance_eventually_completes_via_fallback() {
    let repo = setup().await;
    let hub = Hub::new();
    let (handle, _join) = AlertQueue::spawn(repo, hub);

    handle.enqueue(follow_facts("alice")).await.unwrap();
    let second = handle.enqueue(follow_facts("bob")).await.unwrap();
    assert_eq!(handle.length().await, 1);

    // duration_ms(1000) + fallback buffer(1000) for "alice" to time out and
    // advance to "bob".
    tokio::time::sleep(Duration::from_millis(2_200)).await;
    assert_eq!(handle.length().await, 0);

    handle.complete(second).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(handle.length().await, 0);
}

#[tokio::test]
async fn resolver_miss_is_not_enqueued() {
    // spec.md §8 scenario S3: a cheer below `min_amount` resolves to no
    // alert at all, so nothing is appended to the queue.
    let store = Store::open_in_memory().await.unwrap();
    let repo = ConfigRepository::new(store);
    repo.create_alert(NewAlert {
        event_type: EventType::Cheer,
        min_amount: Some(500.0),
        ..Default::default()
    })
    .await
    .unwrap();

    let hub = Hub::new();
    let (handle, _join) = AlertQueue::spawn(repo, hub);

    let facts = TriggerFacts {
        event_type: Some(EventType::Cheer),
        username: Some("carol".to_string()),
        amount: Some(200.0),
        ..Default::default()
    };
    let result = handle.enqueue(facts).await.unwrap();
    assert!(result.is_none());
    assert_eq!(handle.length().await, 0);
}

#[tokio::test]
async fn unconfigured_event_type_is_not_enqueued() {
    let store = Store::open_in_memory().await.unwrap();
    let repo = ConfigRepository::new(store);
    let hub = Hub::new();
    let (handle, _join) = AlertQueue::spawn(repo, hub);

    let facts = TriggerFacts {
        event_type: Some(EventType::Raid),
        username: Some("dave".to_string()),
        ..Default::default()
    };
    let result = handle.enqueue(facts).await.unwrap();
    assert!(result.is_none());
    assert_eq!(handle.length().await, 0);
}

#[tokio::test]
async fn ack_completion_is_idempotent() {
    let repo = setup().await;
    let hub = Hub::new();
    let (handle, _join) = AlertQueue::spawn(repo, hub);

    let first = handle.enqueue(follow_facts("alice")).await.unwrap();
    handle.enqueue(follow_facts("bob")).await.unwrap();

    handle.complete(first).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    // "bob" is now current, pending is empty.
    assert_eq!(handle.length().await, 0);

    // A second ack for the already-completed "alice" id must be ignored —
    // it no longer matches current ("bob"), so nothing advances early.
    handle.complete(first).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(handle.length().await, 0);
}
