//! Lifecycle/pipeline tracker boundary.
//!
//! The tracker that records application stages lives in another service;
//! this engine only emits a "document improved" notification carrying the
//! artifact path. The notification is fire-and-forget — tracker failures
//! never affect the run's result.

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

/// Receives the "document improved" notification at the end of a run.
#[async_trait]
pub trait PipelineTracker: Send + Sync {
    async fn document_improved(&self, document_id: Uuid, version: i32, artifact_key: &str);
}

/// Default tracker: logs the notification. Used when no webhook is
/// configured (local dev, tests).
pub struct LoggingTracker;

#[async_trait]
impl PipelineTracker for LoggingTracker {
    async fn document_improved(&self, document_id: Uuid, version: i32, artifact_key: &str) {
        info!(
            "Document {} improved: plan v{} at {}",
            document_id, version, artifact_key
        );
    }
}

/// Webhook tracker: POSTs the notification to the pipeline service.
pub struct WebhookTracker {
    client: reqwest::Client,
    url: String,
}

impl WebhookTracker {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            url,
        }
    }
}

#[async_trait]
impl PipelineTracker for WebhookTracker {
    async fn document_improved(&self, document_id: Uuid, version: i32, artifact_key: &str) {
        let payload = serde_json::json!({
            "event": "document_improved",
            "document_id": document_id,
            "plan_version": version,
            "artifact_key": artifact_key,
        });

        match self.client.post(&self.url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => warn!(
                "Tracker webhook returned {} for document {}",
                resp.status(),
                document_id
            ),
            Err(e) => warn!("Tracker webhook failed for document {document_id}: {e}"),
        }
    }
}
