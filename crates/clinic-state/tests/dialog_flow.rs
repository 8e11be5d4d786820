//! Dialog stores driven through real mutations against the in-memory backend.

use clinic_model::{FeatureArea, Record, Role, Session};
use clinic_state::{
    CREATED_BY, CompletionEffect, DialogStore, FeatureStores, MutationRequest, MutationService,
    MutationSuccess, NotificationLevel, ServiceError, UPDATED_BY,
};
use clinic_transport::{CachingClient, InMemoryTransport, Transport};

fn backend() -> CachingClient<InMemoryTransport> {
    CachingClient::new(
        InMemoryTransport::new()
            .with_unique("users", &["email"])
            .with_records("users", [Record::new().with("email", "admin@clinic.test")]),
    )
}

fn user(email: &str) -> Record {
    Record::new().with("email", email)
}

#[tokio::test]
async fn successful_create_closes_dialog_and_stamps_creator() {
    let transport = backend();
    let session = Session::signed_in(1, Role::Admin);
    let service = MutationService::new(&transport, &session);
    let mut stores = FeatureStores::new();

    let store = stores.get_mut(FeatureArea::User);
    store.on_add();
    let ticket = store.begin_save();
    assert!(store.state().is_saving);

    let outcome = service
        .run(MutationRequest::create(ticket, user("nurse@clinic.test")))
        .await;
    let effect = stores.complete(&outcome);

    let CompletionEffect::Notify(notification) = effect else {
        panic!("completion should apply");
    };
    assert_eq!(notification.level, NotificationLevel::Success);
    assert_eq!(notification.message, "User created successfully");

    let state = stores.get(FeatureArea::User).state();
    assert!(!state.show_dialog);
    assert!(!state.is_saving);

    let Ok(MutationSuccess::Created(record)) = &outcome.result else {
        panic!("create should succeed");
    };
    assert_eq!(record.get(CREATED_BY), Some(&1.into()));

    let listed = transport.list("users").await.unwrap();
    assert_eq!(listed.data.len(), 2);
}

#[tokio::test]
async fn conflict_keeps_dialog_open_for_correction() {
    let transport = backend();
    let session = Session::signed_in(1, Role::Admin);
    let service = MutationService::new(&transport, &session);
    let mut store = DialogStore::new(FeatureArea::User);

    store.on_add();
    let ticket = store.begin_save();
    let outcome = service
        .run(MutationRequest::create(ticket, user("admin@clinic.test")))
        .await;
    let effect = store.complete(&outcome);

    let CompletionEffect::Notify(notification) = effect else {
        panic!("completion should apply");
    };
    assert_eq!(notification.level, NotificationLevel::Error);
    assert!(notification.message.starts_with("email already exists"));
    assert!(store.state().show_dialog);
    assert!(!store.state().is_saving);
}

#[tokio::test]
async fn missing_record_force_closes_dialog() {
    let transport = backend();
    let session = Session::signed_in(1, Role::Admin);
    let service = MutationService::new(&transport, &session);
    let mut store = DialogStore::new(FeatureArea::User);

    store.on_edit(99);
    let ticket = store.begin_save();
    let outcome = service
        .run(MutationRequest::update(ticket, 99, user("ghost@clinic.test")))
        .await;
    assert!(matches!(&outcome.result, Err(ServiceError::Transport(err)) if err.is_not_found()));

    store.complete(&outcome);
    assert!(!store.state().show_dialog);
    assert!(store.state().is_new());
}

#[tokio::test]
async fn update_stamps_updater() {
    let transport = backend();
    let session = Session::signed_in(4, Role::Admin);
    let service = MutationService::new(&transport, &session);
    let mut store = DialogStore::new(FeatureArea::User);

    store.on_edit(1);
    let ticket = store.begin_save();
    let outcome = service
        .run(MutationRequest::update(ticket, 1, user("root@clinic.test")))
        .await;
    store.complete(&outcome);

    let stored = transport.record("users", 1).await.unwrap();
    assert_eq!(stored.data.get(UPDATED_BY), Some(&4.into()));
}

#[tokio::test]
async fn completion_after_reopen_is_discarded() {
    let transport = backend();
    let session = Session::signed_in(1, Role::Admin);
    let service = MutationService::new(&transport, &session);
    let mut store = DialogStore::new(FeatureArea::User);

    store.on_edit(1);
    let ticket = store.begin_save();
    store.on_closing();
    store.on_edit(1);
    let reopened = store.state().clone();

    let outcome = service
        .run(MutationRequest::update(ticket, 1, user("late@clinic.test")))
        .await;
    assert_eq!(store.complete(&outcome), CompletionEffect::Discarded);
    assert_eq!(store.state(), &reopened);
}

#[tokio::test]
async fn role_without_access_is_rejected_before_transport() {
    let transport = backend();
    let session = Session::signed_in(3, Role::Staff);
    let service = MutationService::new(&transport, &session);
    let mut store = DialogStore::new(FeatureArea::Checkup);

    store.on_add();
    let ticket = store.begin_save();
    let outcome = service
        .run(MutationRequest::create(ticket, Record::new().with("patientId", 1)))
        .await;
    assert_eq!(
        outcome.result,
        Err(ServiceError::Forbidden {
            role: Role::Staff,
            area: FeatureArea::Checkup,
        })
    );
    assert_eq!(transport.inner().request_count(), 0);

    let anonymous = Session::default();
    let service = MutationService::new(&transport, &anonymous);
    assert_eq!(
        service.authorize(FeatureArea::Patient),
        Err(ServiceError::NotSignedIn)
    );
}

#[tokio::test]
async fn delete_from_list_view_reports_success() {
    let transport = backend();
    let session = Session::signed_in(1, Role::Admin);
    let service = MutationService::new(&transport, &session);
    let mut store = DialogStore::new(FeatureArea::User);

    let ticket = store.begin_save();
    let outcome = service.run(MutationRequest::delete(ticket, 1)).await;
    let CompletionEffect::Notify(notification) = store.complete(&outcome) else {
        panic!("completion should apply");
    };
    assert_eq!(notification.message, "User deleted successfully");
    assert!(transport.list("users").await.unwrap().data.is_empty());
}
