//! Orchestrator — sequences one improvement run end to end.
//!
//! Flow: load documents → plan (fatal on failure) → apply + fallback →
//!       audit (non-fatal) → persist plan artifact + final document →
//!       notify tracker → return combined report.
//!
//! Strictly linear, no loops, no internal retries. The run performs no
//! observable side effects until the persist step, so cancellation before
//! that point is always safe. The working document is exclusively owned by
//! the run; independent runs for other documents need no coordination.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::refinement::auditor::audit_edits;
use crate::refinement::collaborator::EditCollaborator;
use crate::refinement::fallback::repair_unresolved;
use crate::refinement::models::{ApplyResult, AuditVerdict};
use crate::refinement::patcher::apply_plan;
use crate::refinement::planner::plan_edits;
use crate::refinement::store;
use crate::refinement::tracker::PipelineTracker;

/// Request body for an improvement run.
#[derive(Debug, Clone, Deserialize)]
pub struct ImproveRequest {
    /// The document holding the verified source facts (e.g. the master
    /// resume or context snapshot) that every edit must trace back to.
    pub reference_document_id: Uuid,
    /// The target context (e.g. job description) to improve the match for.
    pub context: String,
}

/// Combined report returned to the caller. The full per-operation lists are
/// always returned — never a single success boolean.
#[derive(Debug, Clone, Serialize)]
pub struct ImproveResponse {
    pub document_id: Uuid,
    pub plan_version: i32,
    pub artifact_key: String,
    pub document: String,
    pub apply_results: Vec<ApplyResult>,
    pub unresolved_count: usize,
    pub audit_status: String,
    pub verdicts: Vec<AuditVerdict>,
    pub audit_summary: Vec<String>,
    pub remaining_gaps: String,
    pub unchanged_rationale: String,
}

/// Runs the full Plan → Apply → Audit pipeline for one document.
pub async fn improve_document(
    pool: &PgPool,
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    collaborator: &dyn EditCollaborator,
    tracker: &dyn PipelineTracker,
    document_id: Uuid,
    request: ImproveRequest,
) -> Result<ImproveResponse, AppError> {
    let document = store::load_document(pool, document_id).await?;
    let reference = store::load_document(pool, request.reference_document_id).await?;

    info!("Planning edits for document {document_id}");
    let output = run_pipeline(
        collaborator,
        &document.content,
        &reference.content,
        &request.context,
    )
    .await?;

    let unresolved_count = output.results.iter().filter(|r| !r.applied).count();
    if unresolved_count > 0 {
        warn!(
            "Document {}: {} of {} operation(s) remain unresolved after fallback",
            document_id,
            unresolved_count,
            output.results.len()
        );
    }

    // Persist step: versioned plan artifact (append-only), then the final
    // document, then the tracker notification. Nothing above this point has
    // observable side effects.
    let artifact =
        store::persist_plan_artifact(pool, s3, s3_bucket, document_id, &output.plan).await?;
    store::save_document(pool, document_id, &output.document).await?;
    tracker
        .document_improved(document_id, artifact.version, &artifact.s3_key)
        .await;

    let audit_status = if output.audit_failed {
        "failed".to_string()
    } else {
        "completed".to_string()
    };

    info!(
        "Improved document {} (plan v{}, {} applied, {} unresolved, audit {})",
        document_id,
        artifact.version,
        output.results.iter().filter(|r| r.applied).count(),
        unresolved_count,
        audit_status
    );

    Ok(ImproveResponse {
        document_id,
        plan_version: artifact.version,
        artifact_key: artifact.s3_key,
        document: output.document,
        apply_results: output.results,
        unresolved_count,
        audit_status,
        verdicts: output.verdicts,
        audit_summary: output.summary,
        remaining_gaps: output.plan.remaining_gaps,
        unchanged_rationale: output.plan.unchanged_rationale,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline core
// ────────────────────────────────────────────────────────────────────────────

/// The three-phase pipeline without the store/tracker boundary.
/// Pure over its inputs apart from the collaborator calls, so the phase
/// sequencing is testable with deterministic fakes; `improve_document`
/// wraps it with load/persist/notify.
pub async fn run_pipeline(
    collaborator: &dyn EditCollaborator,
    document: &str,
    reference: &str,
    context: &str,
) -> Result<PipelineOutput, AppError> {
    let plan = plan_edits(collaborator, document, reference, context).await?;

    let outcome = apply_plan(document, &plan);
    let mut results = outcome.results;
    let working = repair_unresolved(collaborator, outcome.document, &plan, &mut results).await;

    let (final_document, verdicts, summary, audit_failed) = match audit_edits(
        collaborator,
        &working,
        document,
        reference,
        context,
        &plan,
        &results,
    )
    .await
    {
        Ok(report) => (report.document, report.verdicts, report.summary, false),
        Err(e) => {
            warn!("Audit failed: {e}; accepting pre-audit document");
            (working, Vec::new(), Vec::new(), true)
        }
    };

    Ok(PipelineOutput {
        plan,
        document: final_document,
        results,
        verdicts,
        summary,
        audit_failed,
    })
}

/// Output of [`run_pipeline`].
#[derive(Debug)]
pub struct PipelineOutput {
    pub plan: crate::refinement::models::EditPlan,
    pub document: String,
    pub results: Vec<ApplyResult>,
    pub verdicts: Vec<AuditVerdict>,
    pub summary: Vec<String>,
    pub audit_failed: bool,
}
