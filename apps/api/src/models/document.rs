use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A tailored document (e.g. a generated resume) as stored in Postgres.
/// `content` is the full text; the improvement engine mutates it in memory
/// and overwrite-saves it at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One versioned improvement-plan artifact.
/// Append-only: versions are monotonic per document and never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImprovementPlanRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub version: i32,
    pub plan: Value,
    pub s3_key: String,
    pub created_at: DateTime<Utc>,
}
