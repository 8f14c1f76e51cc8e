//! Document store — Postgres rows plus S3 plan-artifact snapshots.
//!
//! Documents are overwrite-saved; improvement plans are append-only with a
//! monotonically increasing version per document (starting at 1), never
//! UPDATEd and never overwritten in S3.

use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{DocumentRow, ImprovementPlanRow};
use crate::refinement::models::EditPlan;

/// Handle to a freshly persisted plan artifact.
pub struct PlanArtifact {
    pub artifact_id: Uuid,
    pub version: i32,
    pub s3_key: String,
}

/// Loads a document by id, or `NotFound`.
pub async fn load_document(pool: &PgPool, document_id: Uuid) -> Result<DocumentRow, AppError> {
    sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = $1")
        .bind(document_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))
}

/// Inserts a new document and returns its row.
pub async fn create_document(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    content: &str,
) -> Result<DocumentRow, AppError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO documents (id, user_id, title, content)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(content)
    .execute(pool)
    .await?;

    load_document(pool, id).await
}

/// Overwrite-saves the final document text at the end of a run.
pub async fn save_document(pool: &PgPool, document_id: Uuid, content: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE documents SET content = $2, updated_at = now() WHERE id = $1")
        .bind(document_id)
        .bind(content)
        .execute(pool)
        .await?;
    Ok(())
}

/// Persists the run's edit plan as a versioned artifact.
/// CRITICAL: This is append-only. Never UPDATE existing rows; the S3 key
/// embeds the version so prior artifacts are never clobbered.
pub async fn persist_plan_artifact(
    pool: &PgPool,
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    document_id: Uuid,
    plan: &EditPlan,
) -> Result<PlanArtifact, AppError> {
    // 1. Determine next version
    let current_max: Option<i32> =
        sqlx::query_scalar("SELECT MAX(version) FROM improvement_plans WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(pool)
            .await?;
    let version = current_max.unwrap_or(0) + 1;

    // 2. Upload the artifact JSON to S3
    let s3_key = format!("plans/{document_id}/v{version}.json");
    let artifact = serde_json::json!({
        "identifier": document_id,
        "version": version,
        "plan": plan,
        "created_at": Utc::now(),
    });
    let body = serde_json::to_vec_pretty(&artifact)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize artifact: {e}")))?;

    s3.put_object()
        .bucket(s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(body))
        .content_type("application/json")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Artifact upload failed: {e}")))?;

    info!("Uploaded plan artifact to s3://{}/{}", s3_bucket, s3_key);

    // 3. Append-only INSERT
    let artifact_id = Uuid::new_v4();
    let plan_value = serde_json::to_value(plan)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize plan: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO improvement_plans (id, document_id, version, plan, s3_key)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(artifact_id)
    .bind(document_id)
    .bind(version)
    .bind(&plan_value)
    .bind(&s3_key)
    .execute(pool)
    .await?;

    info!("Persisted plan artifact {artifact_id} v{version} for document {document_id}");

    Ok(PlanArtifact {
        artifact_id,
        version,
        s3_key,
    })
}

/// Returns the append-only plan artifact history for a document.
pub async fn get_plan_history(
    pool: &PgPool,
    document_id: Uuid,
) -> Result<Vec<ImprovementPlanRow>, AppError> {
    Ok(sqlx::query_as::<_, ImprovementPlanRow>(
        "SELECT * FROM improvement_plans WHERE document_id = $1 ORDER BY version ASC",
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?)
}
