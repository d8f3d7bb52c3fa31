//! Cancellation and timeout behaviour of in-flight operations.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use spdesk_core::domain::{ListQuery, ServiceConfig};
use spdesk_core::error::{RemoteError, ServiceError};
use tests::{harness, harness_with, record, MockContentClient};

#[tokio::test]
async fn cancel_current_aborts_the_in_flight_operation() {
    let client = MockContentClient::new().with_delay(Duration::from_secs(5));
    let h = Arc::new(harness(client));

    let svc = Arc::clone(&h);
    let call = tokio::spawn(async move { svc.service.list_items(ListQuery::default()).await });

    // Give the spawned call time to register itself.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(h.service.cancel_current());

    let err = call.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Remote(RemoteError::Cancelled)
    ));

    // The registration was consumed by the cancel.
    assert!(!h.service.cancel_current());
}

#[tokio::test]
async fn cancel_with_nothing_in_flight_is_a_no_op() {
    let h = harness(MockContentClient::new());
    assert!(!h.service.cancel_current());
}

#[tokio::test]
async fn completed_operations_leave_nothing_to_cancel() {
    let client = MockContentClient::new().with_item(1, record(json!({"ID": 1})));
    let h = harness(client);

    h.service.list_items(ListQuery::default()).await.unwrap();
    assert!(!h.service.cancel_current());
}

#[tokio::test]
async fn cancel_reaches_only_the_latest_of_two_overlapping_calls() {
    let client = MockContentClient::new()
        .with_delay(Duration::from_secs(2))
        .with_item(1, record(json!({"ID": 1})));
    let h = Arc::new(harness(client));

    let first_h = Arc::clone(&h);
    let first = tokio::spawn(async move { first_h.service.get_item("Tasks", 1, "").await });
    tokio::time::sleep(Duration::from_millis(150)).await;

    let second_h = Arc::clone(&h);
    let second =
        tokio::spawn(async move { second_h.service.list_items(ListQuery::default()).await });
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Only the most recent registration is cancellable.
    assert!(h.service.cancel_current());

    let second_err = second.await.unwrap().unwrap_err();
    assert!(matches!(
        second_err,
        ServiceError::Remote(RemoteError::Cancelled)
    ));

    let first_item = first.await.unwrap().unwrap();
    assert_eq!(first_item.extract_id(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn operations_time_out_at_the_global_deadline() {
    let client = MockContentClient::new().with_delay(Duration::from_secs(600));
    let config = ServiceConfig {
        global_timeout_secs: 2,
        ..Default::default()
    };
    let h = harness_with(client, config);

    let err = h
        .service
        .list_items(ListQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Remote(RemoteError::TimedOut)));
}

#[tokio::test]
async fn service_remains_usable_after_a_cancelled_operation() {
    let client = MockContentClient::new()
        .with_delay(Duration::from_millis(500))
        .with_item(1, record(json!({"ID": 1, "Title": "still here"})));
    let h = Arc::new(harness(client));

    let svc = Arc::clone(&h);
    let call = tokio::spawn(async move { svc.service.list_items(ListQuery::default()).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(h.service.cancel_current());
    assert!(call.await.unwrap().is_err());

    // Next call goes through the same session.
    let item = h.service.get_item("Tasks", 1, "").await.unwrap();
    assert_eq!(item.0["Title"], json!("still here"));
    assert_eq!(h.sessions_built(), 1);
}
