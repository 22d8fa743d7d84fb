use std::sync::Arc;

use crate::application::ports::StagingStore;
use crate::application::services::SubmissionService;

#[derive(Clone)]
pub struct AppState {
    pub submission_service: Arc<SubmissionService>,
    pub staging_store: Arc<dyn StagingStore>,
}
