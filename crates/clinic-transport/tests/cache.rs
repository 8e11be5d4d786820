//! Query cache behaviour against the in-memory backend.

use clinic_model::Record;
use clinic_transport::{CachingClient, InMemoryTransport, Transport};

fn patient(name: &str) -> Record {
    Record::new().with("firstName", name)
}

fn client() -> CachingClient<InMemoryTransport> {
    CachingClient::new(
        InMemoryTransport::new()
            .with_unique("patients", &["firstName"])
            .with_records("patients", [patient("Ana"), patient("Ben")]),
    )
}

#[tokio::test]
async fn repeated_list_is_served_from_cache() {
    let client = client();
    let first = client.list("patients").await.unwrap();
    let second = client.list("patients").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(client.inner().request_count(), 1);
}

#[tokio::test]
async fn successful_write_invalidates_list() {
    let client = client();
    assert_eq!(client.list("patients").await.unwrap().data.len(), 2);

    client.post("patients", patient("Cara")).await.unwrap();
    let refreshed = client.list("patients").await.unwrap();

    assert_eq!(refreshed.data.len(), 3);
    assert_eq!(client.inner().request_count(), 3);
}

#[tokio::test]
async fn update_invalidates_cached_record() {
    let client = client();
    let before = client.record("patients", 1).await.unwrap();
    assert_eq!(before.data.get("firstName"), Some(&"Ana".into()));

    client
        .put("patients", 1, patient("Anabel"))
        .await
        .unwrap();
    let after = client.record("patients", 1).await.unwrap();
    assert_eq!(after.data.get("firstName"), Some(&"Anabel".into()));
}

#[tokio::test]
async fn failed_write_keeps_cache() {
    let client = client();
    client.list("patients").await.unwrap();

    let err = client.post("patients", patient("Ana")).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(client.inner().request_count(), 2);

    assert_eq!(client.list("patients").await.unwrap().data.len(), 2);
    assert_eq!(client.inner().request_count(), 2);
}

#[tokio::test]
async fn delete_then_record_is_not_found() {
    let client = client();
    client.record("patients", 2).await.unwrap();
    client.delete("patients", 2).await.unwrap();
    let err = client.record("patients", 2).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn explicit_invalidation_clears_entity_only() {
    let client = CachingClient::new(
        InMemoryTransport::new()
            .with_records("patients", [patient("Ana")])
            .with_records("users", [Record::new().with("email", "a@clinic.test")]),
    );
    client.list("patients").await.unwrap();
    client.list("users").await.unwrap();
    client.invalidate("patients").await;

    client.list("users").await.unwrap();
    assert_eq!(client.inner().request_count(), 2);
    client.list("patients").await.unwrap();
    assert_eq!(client.inner().request_count(), 3);
}
