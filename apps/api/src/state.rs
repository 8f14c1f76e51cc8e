use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::refinement::collaborator::EditCollaborator;
use crate::refinement::tracker::PipelineTracker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// The generative collaborator behind plan/repair/audit.
    /// Trait object so tests substitute deterministic fakes.
    pub collaborator: Arc<dyn EditCollaborator>,
    /// Lifecycle/pipeline tracker notified after each persisted run.
    pub tracker: Arc<dyn PipelineTracker>,
}
