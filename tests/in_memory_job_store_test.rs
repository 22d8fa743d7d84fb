use chrono::Utc;

use visage::application::ports::{JobStore, JobStoreError};
use visage::domain::{Job, JobId, JobStatus, SourceReference};
use visage::infrastructure::persistence::InMemoryJobStore;

async fn seeded(store: &InMemoryJobStore) -> JobId {
    let job = Job::new(SourceReference::from_raw("img-1"));
    let id = job.id;
    store.create(&job).await.unwrap();
    id
}

#[tokio::test]
async fn given_created_job_when_fetched_then_record_matches() {
    let store = InMemoryJobStore::new();
    let id = seeded(&store).await;

    let job = store.get(id).await.unwrap().unwrap();
    assert_eq!(job.id, id);
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.source_reference.as_str(), "img-1");
}

#[tokio::test]
async fn given_duplicate_id_when_creating_then_second_create_fails() {
    let store = InMemoryJobStore::new();
    let job = Job::new(SourceReference::from_raw("img-1"));
    store.create(&job).await.unwrap();

    let result = store.create(&job).await;
    assert!(matches!(result, Err(JobStoreError::QueryFailed(_))));
}

#[tokio::test]
async fn given_unknown_id_when_fetching_then_absent() {
    let store = InMemoryJobStore::new();
    assert!(store.get(JobId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn given_processing_update_then_start_timestamp_is_stamped_without_payload() {
    let store = InMemoryJobStore::new();
    let id = seeded(&store).await;

    store
        .update_status(id, JobStatus::Processing, Utc::now(), None)
        .await
        .unwrap();

    let job = store.get(id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Processing);
    assert!(job.processing_started_at.is_some());
    assert!(job.completed_at.is_none());
    assert!(job.result_payload.is_none());
}

#[tokio::test]
async fn given_terminal_update_then_completion_timestamp_and_payload_are_stamped() {
    let store = InMemoryJobStore::new();
    let id = seeded(&store).await;

    store
        .update_status(id, JobStatus::Processing, Utc::now(), None)
        .await
        .unwrap();
    store
        .update_status(id, JobStatus::Completed, Utc::now(), Some("{\"ok\":true}"))
        .await
        .unwrap();

    let job = store.get(id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.completed_at.is_some());
    assert_eq!(job.result_payload.as_deref(), Some("{\"ok\":true}"));
}

#[tokio::test]
async fn given_terminal_job_when_updating_again_then_transition_is_rejected() {
    let store = InMemoryJobStore::new();
    let id = seeded(&store).await;

    store
        .update_status(id, JobStatus::Failed, Utc::now(), Some("{}"))
        .await
        .unwrap();

    let result = store
        .update_status(id, JobStatus::Processing, Utc::now(), None)
        .await;
    assert!(matches!(result, Err(JobStoreError::InvalidTransition(_))));

    // the terminal record is untouched
    let job = store.get(id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
}

#[tokio::test]
async fn given_unknown_id_when_updating_then_not_found() {
    let store = InMemoryJobStore::new();
    let id = JobId::new();

    let result = store
        .update_status(id, JobStatus::Processing, Utc::now(), None)
        .await;
    assert!(matches!(result, Err(JobStoreError::NotFound(u)) if u == id.as_uuid()));
}
