//! Axum route handlers for the Document Improvement API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{DocumentRow, ImprovementPlanRow};
use crate::refinement::engine::{improve_document, ImproveRequest, ImproveResponse};
use crate::refinement::store;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PlanHistoryResponse {
    pub document_id: Uuid,
    pub plans: Vec<ImprovementPlanRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents
///
/// Stores a document (e.g. a previously generated tailored resume) so it can
/// be improved against future contexts.
pub async fn handle_create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<Json<DocumentRow>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    let row =
        store::create_document(&state.db, request.user_id, &request.title, &request.content)
            .await?;
    Ok(Json(row))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DocumentRow>, AppError> {
    let row = store::load_document(&state.db, document_id).await?;
    Ok(Json(row))
}

/// POST /api/v1/documents/:id/improve
///
/// Runs the full Plan → Apply → Audit pipeline against the stored document
/// and returns the final text plus the combined apply/audit report.
pub async fn handle_improve_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<ImproveResponse>, AppError> {
    if request.context.trim().is_empty() {
        return Err(AppError::Validation("context cannot be empty".to_string()));
    }
    if request.reference_document_id == document_id {
        return Err(AppError::Validation(
            "reference_document_id must differ from the document being improved".to_string(),
        ));
    }

    let response = improve_document(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        state.collaborator.as_ref(),
        state.tracker.as_ref(),
        document_id,
        request,
    )
    .await?;

    Ok(Json(response))
}

/// GET /api/v1/documents/:id/plans
///
/// Append-only history of improvement-plan artifacts for a document.
pub async fn handle_plan_history(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<PlanHistoryResponse>, AppError> {
    // 404 for unknown documents rather than an empty history.
    store::load_document(&state.db, document_id).await?;
    let plans = store::get_plan_history(&state.db, document_id).await?;
    Ok(Json(PlanHistoryResponse { document_id, plans }))
}
