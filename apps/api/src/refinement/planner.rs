//! EditPlanner — one collaborator call, parsed into a capped `EditPlan`.
//!
//! Planning is the only fatal phase: a collaborator error or an empty plan
//! aborts the run before anything downstream touches the document, and no
//! artifact is persisted.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::refinement::collaborator::EditCollaborator;
use crate::refinement::models::{EditPlan, MAX_PLAN_OPERATIONS};

/// Obtains an edit plan for `document` and enforces `1 ≤ len ≤ 8`.
/// Over-long plans are truncated with order preserved; the plan is
/// immutable from here on.
pub async fn plan_edits(
    collaborator: &dyn EditCollaborator,
    document: &str,
    reference: &str,
    context: &str,
) -> Result<EditPlan, AppError> {
    let mut plan = collaborator
        .plan(document, reference, context)
        .await
        .map_err(|e| AppError::Planning(e.to_string()))?;

    if plan.operations.is_empty() {
        return Err(AppError::Planning(
            "collaborator returned zero operations".to_string(),
        ));
    }

    if plan.operations.len() > MAX_PLAN_OPERATIONS {
        warn!(
            "Plan proposed {} operations; truncating to {}",
            plan.operations.len(),
            MAX_PLAN_OPERATIONS
        );
        plan.operations.truncate(MAX_PLAN_OPERATIONS);
    }

    info!("Edit plan ready: {} operations", plan.operations.len());
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refinement::collaborator::AuditRequest;
    use crate::refinement::models::{AuditOutcome, EditKind, EditOperation};
    use async_trait::async_trait;

    /// Deterministic fake: returns a pre-canned plan or an error.
    struct FakePlanner {
        plan: Option<EditPlan>,
    }

    #[async_trait]
    impl EditCollaborator for FakePlanner {
        async fn plan(&self, _d: &str, _r: &str, _c: &str) -> Result<EditPlan, AppError> {
            self.plan
                .clone()
                .ok_or_else(|| AppError::Llm("boom".to_string()))
        }

        async fn repair(&self, _d: &str, _e: &[String]) -> Result<String, AppError> {
            unreachable!("planner tests never repair")
        }

        async fn audit(&self, _r: AuditRequest<'_>) -> Result<AuditOutcome, AppError> {
            unreachable!("planner tests never audit")
        }
    }

    fn op(n: usize) -> EditOperation {
        EditOperation {
            kind: EditKind::Replace,
            target: format!("Acme bullet {n}"),
            current_text: format!("old {n}"),
            proposed_text: format!("new {n}"),
            rationale: String::new(),
            source_evidence: String::new(),
        }
    }

    fn plan_with(n: usize) -> EditPlan {
        EditPlan {
            operations: (1..=n).map(op).collect(),
            remaining_gaps: String::new(),
            unchanged_rationale: String::new(),
        }
    }

    #[tokio::test]
    async fn test_plan_within_cap_passes_through() {
        let fake = FakePlanner {
            plan: Some(plan_with(3)),
        };
        let plan = plan_edits(&fake, "doc", "ref", "ctx").await.unwrap();
        assert_eq!(plan.operations.len(), 3);
    }

    #[tokio::test]
    async fn test_plan_over_cap_truncates_preserving_order() {
        let fake = FakePlanner {
            plan: Some(plan_with(10)),
        };
        let plan = plan_edits(&fake, "doc", "ref", "ctx").await.unwrap();
        assert_eq!(plan.operations.len(), 8);
        assert_eq!(plan.operations[0].target, "Acme bullet 1");
        assert_eq!(plan.operations[7].target, "Acme bullet 8");
    }

    #[tokio::test]
    async fn test_zero_operations_is_planning_failure() {
        let fake = FakePlanner {
            plan: Some(plan_with(0)),
        };
        let err = plan_edits(&fake, "doc", "ref", "ctx").await.unwrap_err();
        assert!(matches!(err, AppError::Planning(_)));
    }

    #[tokio::test]
    async fn test_collaborator_error_is_planning_failure() {
        let fake = FakePlanner { plan: None };
        let err = plan_edits(&fake, "doc", "ref", "ctx").await.unwrap_err();
        assert!(matches!(err, AppError::Planning(_)));
    }
}
