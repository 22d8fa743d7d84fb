use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use visage::application::ports::{AnalysisGateway, JobStore, StagingStore};
use visage::application::services::{AnalysisWorker, BoundedWorkQueue, SubmissionService};
use visage::domain::WorkUnit;
use visage::infrastructure::analysis::{HttpVisionGateway, MockAnalysisGateway};
use visage::infrastructure::observability::{TracingConfig, init_tracing};
use visage::infrastructure::persistence::{InMemoryJobStore, PgJobStore, create_pool};
use visage::infrastructure::storage::LocalStagingStore;
use visage::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();

    init_tracing(
        TracingConfig {
            json_format: settings.logging.enable_json,
            default_level: settings.logging.level.clone(),
            ..TracingConfig::default()
        },
        settings.server.port,
    );

    let staging_store: Arc<dyn StagingStore> = Arc::new(
        LocalStagingStore::new(settings.staging.root_dir.clone())
            .map_err(|e| anyhow::anyhow!("failed to open staging directory: {}", e))?,
    );

    let job_store: Arc<dyn JobStore> = match &settings.database.url {
        Some(url) => {
            let pool = create_pool(url, settings.database.max_connections)
                .await
                .map_err(|e| anyhow::anyhow!("database unavailable: {}", e))?;
            sqlx::migrate!().run(&pool).await?;
            Arc::new(PgJobStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, job records will not survive a restart");
            Arc::new(InMemoryJobStore::new())
        }
    };

    let gateway: Arc<dyn AnalysisGateway> = if settings.analysis.base_url.is_empty() {
        tracing::warn!("ANALYSIS_BASE_URL not set, using the mock analysis gateway");
        Arc::new(MockAnalysisGateway::default())
    } else {
        Arc::new(
            HttpVisionGateway::new(
                Arc::clone(&staging_store),
                settings.analysis.base_url.clone(),
                settings.analysis.api_key.clone(),
            )
            .map_err(|e| anyhow::anyhow!("failed to build vision gateway: {}", e))?,
        )
    };

    let queue = Arc::new(BoundedWorkQueue::<WorkUnit>::new(settings.queue.capacity));
    let shutdown = CancellationToken::new();

    let worker = AnalysisWorker::new(
        Arc::clone(&queue),
        Arc::clone(&job_store),
        Arc::clone(&gateway),
        Arc::clone(&staging_store),
        settings.analysis.secondary_kinds.clone(),
        shutdown.clone(),
    );
    let worker_handle = tokio::spawn(worker.run());

    let submission_service = Arc::new(SubmissionService::new(
        Arc::clone(&job_store),
        Arc::clone(&queue),
    ));

    let state = AppState {
        submission_service,
        staging_store,
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!(
        queue_capacity = queue.capacity(),
        "Listening on {}",
        addr
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // shutdown handshake: close the queue, signal the worker, join it
    tracing::info!("Shutting down");
    queue.close();
    shutdown.cancel();
    if let Err(e) = worker_handle.await {
        tracing::error!(error = %e, "worker task did not shut down cleanly");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
