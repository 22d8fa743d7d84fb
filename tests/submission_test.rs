use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use bytes::Bytes;

use visage::application::ports::{
    AnalysisError, AnalysisGateway, JobStore, StagingStore, StagingStoreError,
};
use visage::application::services::{
    AnalysisWorker, BoundedWorkQueue, QueueError, SubmissionService, SubmitError,
};
use visage::domain::{
    AnalysisReport, Classification, Job, JobId, JobStatus, SecondaryKind, SourceReference,
};
use visage::infrastructure::persistence::InMemoryJobStore;
use visage::infrastructure::storage::MockStagingStore;

struct HappyGateway;

#[async_trait]
impl AnalysisGateway for HappyGateway {
    async fn run_primary(
        &self,
        _source: &SourceReference,
        _cancel: &CancellationToken,
    ) -> Result<Classification, AnalysisError> {
        Ok(Classification {
            tag: "A".to_string(),
            score: 0.9,
        })
    }

    async fn run_secondary(
        &self,
        _kind: SecondaryKind,
        _source: &SourceReference,
        _cancel: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        Ok("hello world".to_string())
    }
}

struct FailingPrimaryGateway;

#[async_trait]
impl AnalysisGateway for FailingPrimaryGateway {
    async fn run_primary(
        &self,
        _source: &SourceReference,
        _cancel: &CancellationToken,
    ) -> Result<Classification, AnalysisError> {
        Err(AnalysisError::RequestFailed("model offline".to_string()))
    }

    async fn run_secondary(
        &self,
        _kind: SecondaryKind,
        _source: &SourceReference,
        _cancel: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        Ok("hello world".to_string())
    }
}

struct FailingSecondaryGateway;

#[async_trait]
impl AnalysisGateway for FailingSecondaryGateway {
    async fn run_primary(
        &self,
        _source: &SourceReference,
        _cancel: &CancellationToken,
    ) -> Result<Classification, AnalysisError> {
        Ok(Classification {
            tag: "A".to_string(),
            score: 0.9,
        })
    }

    async fn run_secondary(
        &self,
        _kind: SecondaryKind,
        _source: &SourceReference,
        _cancel: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        Err(AnalysisError::RequestFailed("ocr offline".to_string()))
    }
}

struct Pipeline {
    service: SubmissionService,
    store: Arc<InMemoryJobStore>,
    staging: Arc<MockStagingStore>,
    queue: Arc<BoundedWorkQueue<visage::domain::WorkUnit>>,
    shutdown: CancellationToken,
    worker: tokio::task::JoinHandle<()>,
}

fn start_pipeline(
    gateway: Arc<dyn AnalysisGateway>,
    secondary_kinds: Vec<SecondaryKind>,
) -> Pipeline {
    let store = Arc::new(InMemoryJobStore::new());
    let staging = Arc::new(MockStagingStore::new());
    let queue = Arc::new(BoundedWorkQueue::new(16));
    let shutdown = CancellationToken::new();
    let worker = AnalysisWorker::new(
        Arc::clone(&queue),
        store.clone() as Arc<dyn JobStore>,
        gateway,
        staging.clone() as Arc<dyn StagingStore>,
        secondary_kinds,
        shutdown.clone(),
    );
    let handle = tokio::spawn(worker.run());
    Pipeline {
        service: SubmissionService::new(store.clone() as Arc<dyn JobStore>, Arc::clone(&queue)),
        store,
        staging,
        queue,
        shutdown,
        worker: handle,
    }
}

impl Pipeline {
    async fn stop(self) {
        self.queue.close();
        self.shutdown.cancel();
        timeout(Duration::from_secs(1), self.worker)
            .await
            .unwrap()
            .unwrap();
    }
}

async fn poll_terminal(store: &InMemoryJobStore, id: JobId) -> Job {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(job) = store.get(id).await.unwrap() {
            if job.status.is_terminal() {
                return job;
            }
        }
        assert!(
            Instant::now() < deadline,
            "job never reached a terminal status"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn parse_report(job: &Job) -> AnalysisReport {
    serde_json::from_str(job.result_payload.as_deref().expect("payload missing")).unwrap()
}

#[tokio::test]
async fn given_submission_when_worker_is_idle_then_job_id_returns_synchronously_as_queued() {
    let store = Arc::new(InMemoryJobStore::new());
    let queue = Arc::new(BoundedWorkQueue::new(16));
    let service = SubmissionService::new(store.clone() as Arc<dyn JobStore>, queue);

    let job_id = service
        .submit(SourceReference::from_raw("img-1"))
        .await
        .unwrap();

    let job = service.get_status(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert!(job.result_payload.is_none());
    assert!(job.processing_started_at.is_none());
}

#[tokio::test]
async fn given_blank_source_when_submitting_then_rejected_synchronously_without_enqueue() {
    let store = Arc::new(InMemoryJobStore::new());
    let queue = Arc::new(BoundedWorkQueue::new(16));
    let service =
        SubmissionService::new(store.clone() as Arc<dyn JobStore>, Arc::clone(&queue));

    let result = service.submit(SourceReference::from_raw("   ")).await;

    assert!(matches!(result, Err(SubmitError::BlankSource)));
    assert!(queue.is_empty());
}

#[tokio::test]
async fn given_closed_queue_when_submitting_then_fails_with_queue_closed() {
    let store = Arc::new(InMemoryJobStore::new());
    let queue = Arc::new(BoundedWorkQueue::new(16));
    queue.close();
    let service = SubmissionService::new(store.clone() as Arc<dyn JobStore>, queue);

    let result = service.submit(SourceReference::from_raw("img-1")).await;

    assert!(matches!(
        result,
        Err(SubmitError::Queue(QueueError::Closed))
    ));
}

#[tokio::test]
async fn given_successful_primary_with_no_secondaries_when_polling_then_completed_with_payload() {
    let pipeline = start_pipeline(Arc::new(HappyGateway), vec![]);

    let job_id = pipeline
        .service
        .submit(SourceReference::from_raw("img-1"))
        .await
        .unwrap();

    let job = poll_terminal(&pipeline.store, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.completed_at.is_some());

    let report = parse_report(&job);
    assert_eq!(
        report.classification,
        Some(Classification {
            tag: "A".to_string(),
            score: 0.9
        })
    );
    assert!(report.error_message.is_none());

    pipeline.stop().await;
}

#[tokio::test]
async fn given_failing_primary_when_polling_then_failed_with_error_message_and_timestamp() {
    let pipeline = start_pipeline(Arc::new(FailingPrimaryGateway), vec![]);

    let job_id = pipeline
        .service
        .submit(SourceReference::from_raw("img-2"))
        .await
        .unwrap();

    let job = poll_terminal(&pipeline.store, job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.completed_at.is_some());

    let report = parse_report(&job);
    let message = report.error_message.expect("error message missing");
    assert!(!message.is_empty());

    pipeline.stop().await;
}

#[tokio::test]
async fn given_failing_secondary_when_polling_then_completed_with_secondary_marked_failed() {
    let pipeline = start_pipeline(
        Arc::new(FailingSecondaryGateway),
        vec![SecondaryKind::TextExtraction],
    );

    let job_id = pipeline
        .service
        .submit(SourceReference::from_raw("img-3"))
        .await
        .unwrap();

    let job = poll_terminal(&pipeline.store, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);

    let report = parse_report(&job);
    assert!(report.classification.is_some());
    assert!(report.error_message.is_none());
    let record = report
        .secondary(SecondaryKind::TextExtraction)
        .expect("secondary record missing");
    assert!(record.content.is_none());
    assert!(record.error.is_some());

    pipeline.stop().await;
}

#[tokio::test]
async fn given_many_submissions_when_polling_then_every_job_reaches_a_terminal_status() {
    let pipeline = start_pipeline(Arc::new(HappyGateway), vec![SecondaryKind::Captioning]);

    let mut ids = Vec::new();
    for i in 0..10 {
        let id = pipeline
            .service
            .submit(SourceReference::from_raw(format!("img-{}", i)))
            .await
            .unwrap();
        ids.push(id);
    }

    for id in ids {
        let job = poll_terminal(&pipeline.store, id).await;
        assert_eq!(job.status, JobStatus::Completed);
    }

    pipeline.stop().await;
}

#[tokio::test]
async fn given_unknown_job_id_when_polling_then_absent() {
    let store = Arc::new(InMemoryJobStore::new());
    let queue = Arc::new(BoundedWorkQueue::new(4));
    let service = SubmissionService::new(store as Arc<dyn JobStore>, queue);

    let status = service.get_status(JobId::new()).await.unwrap();
    assert!(status.is_none());
}

#[tokio::test]
async fn given_terminal_job_when_checking_staging_then_uploaded_image_is_gone() {
    let pipeline = start_pipeline(Arc::new(HappyGateway), vec![]);

    let source = SourceReference::from_raw("uploads/receipt.jpg");
    pipeline
        .staging
        .store(&source, Bytes::from_static(b"fake jpeg bytes"))
        .await
        .unwrap();

    let job_id = pipeline.service.submit(source.clone()).await.unwrap();
    let job = poll_terminal(&pipeline.store, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);

    let leftover = pipeline.staging.fetch(&source).await;
    assert!(matches!(leftover, Err(StagingStoreError::NotFound(_))));

    pipeline.stop().await;
}
