//! CredibilityAuditor — re-reviews only the spans the plan actually changed.
//!
//! Verdicts are matched back to plan operations by `target`, and corrections
//! are applied only to spans equal to that operation's own `proposed_text`
//! (soften) or restored from its `current_text` (revert). A verdict that
//! names a string appearing elsewhere in the document produces zero changes:
//! the auditor never guesses an alternate location.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::refinement::collaborator::{AuditRequest, EditCollaborator};
use crate::refinement::models::{ApplyResult, AuditVerdict, EditKind, EditPlan, VerdictKind};

/// Result of the audit phase: the corrected document plus the verdict list
/// and human-readable summary for the combined report.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub document: String,
    pub verdicts: Vec<AuditVerdict>,
    pub summary: Vec<String>,
}

/// Runs the audit collaborator call and applies its verdicts.
///
/// Errors here mean the collaborator call itself failed; the orchestrator
/// treats that as non-fatal and keeps the pre-audit document.
pub async fn audit_edits(
    collaborator: &dyn EditCollaborator,
    document: &str,
    pre_edit_document: &str,
    reference_document: &str,
    context: &str,
    plan: &EditPlan,
    results: &[ApplyResult],
) -> Result<AuditReport, AppError> {
    let outcome = collaborator
        .audit(AuditRequest {
            document,
            pre_edit_document,
            reference_document,
            context,
            plan,
            results,
        })
        .await?;

    let corrected = apply_verdicts(document, plan, &outcome.verdicts);

    let softened = count_kind(&outcome.verdicts, VerdictKind::Soften);
    let reverted = count_kind(&outcome.verdicts, VerdictKind::Revert);
    info!(
        "Audit complete: {} verdict(s), {} softened, {} reverted",
        outcome.verdicts.len(),
        softened,
        reverted
    );

    Ok(AuditReport {
        document: corrected,
        verdicts: outcome.verdicts,
        summary: outcome.summary,
    })
}

fn count_kind(verdicts: &[AuditVerdict], kind: VerdictKind) -> usize {
    verdicts.iter().filter(|v| v.verdict == kind).count()
}

/// Applies verdicts to `document`. Pure.
///
/// - `pass`: no change.
/// - `soften`: the operation's `proposed_text`, located verbatim, becomes
///   `revised_text`. Not found → silently skipped.
/// - `revert`: for Replace operations only, `proposed_text` located verbatim
///   is restored to `current_text`. For Add/Remove a revert is a recorded
///   no-op: the audit contract treats only replace-shaped edits as
///   revertible.
pub fn apply_verdicts(document: &str, plan: &EditPlan, verdicts: &[AuditVerdict]) -> String {
    let mut doc = document.to_string();

    for verdict in verdicts {
        let Some(op) = plan.operations.iter().find(|op| op.target == verdict.target) else {
            warn!(
                "Audit verdict targets unknown operation '{}'; ignoring",
                verdict.target
            );
            continue;
        };

        match verdict.verdict {
            VerdictKind::Pass => {}
            VerdictKind::Soften => {
                let Some(revised) = verdict.revised_text.as_deref() else {
                    warn!("Soften verdict for '{}' lacks revised_text; skipping", op.target);
                    continue;
                };
                if !op.proposed_text.is_empty() && doc.contains(&op.proposed_text) {
                    doc = doc.replacen(&op.proposed_text, revised, 1);
                }
            }
            VerdictKind::Revert => {
                if op.kind != EditKind::Replace {
                    continue;
                }
                if !op.proposed_text.is_empty() && doc.contains(&op.proposed_text) {
                    doc = doc.replacen(&op.proposed_text, &op.current_text, 1);
                }
            }
        }
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refinement::models::EditOperation;

    fn op(kind: EditKind, target: &str, current: &str, proposed: &str) -> EditOperation {
        EditOperation {
            kind,
            target: target.to_string(),
            current_text: current.to_string(),
            proposed_text: proposed.to_string(),
            rationale: String::new(),
            source_evidence: String::new(),
        }
    }

    fn plan(ops: Vec<EditOperation>) -> EditPlan {
        EditPlan {
            operations: ops,
            remaining_gaps: String::new(),
            unchanged_rationale: String::new(),
        }
    }

    fn verdict(target: &str, kind: VerdictKind, revised: Option<&str>) -> AuditVerdict {
        AuditVerdict {
            target: target.to_string(),
            verdict: kind,
            issue: String::new(),
            revised_text: revised.map(str::to_string),
        }
    }

    #[test]
    fn test_pass_changes_nothing() {
        let doc = "### Acme\n- Architected X\n";
        let plan = plan(vec![op(
            EditKind::Replace,
            "Acme bullet 1",
            "Built X",
            "Architected X",
        )]);
        let out = apply_verdicts(doc, &plan, &[verdict("Acme bullet 1", VerdictKind::Pass, None)]);
        assert_eq!(out, doc);
    }

    #[test]
    fn test_soften_replaces_proposed_text_verbatim() {
        let doc = "### Acme\n- Architected X\n- Led Y\n";
        let plan = plan(vec![op(
            EditKind::Replace,
            "Acme bullet 1",
            "Built X",
            "Architected X",
        )]);
        let out = apply_verdicts(
            doc,
            &plan,
            &[verdict(
                "Acme bullet 1",
                VerdictKind::Soften,
                Some("Co-architected X"),
            )],
        );
        assert_eq!(out, "### Acme\n- Co-architected X\n- Led Y\n");
    }

    #[test]
    fn test_soften_with_absent_span_is_silently_skipped() {
        let doc = "### Acme\n- Something else entirely\n";
        let plan = plan(vec![op(
            EditKind::Replace,
            "Acme bullet 1",
            "Built X",
            "Architected X",
        )]);
        let out = apply_verdicts(
            doc,
            &plan,
            &[verdict(
                "Acme bullet 1",
                VerdictKind::Soften,
                Some("Co-architected X"),
            )],
        );
        assert_eq!(out, doc, "never guess an alternate location");
    }

    #[test]
    fn test_revert_restores_current_text_for_replace() {
        let doc = "### Acme\n- Architected X\n";
        let plan = plan(vec![op(
            EditKind::Replace,
            "Acme bullet 1",
            "Built X",
            "Architected X",
        )]);
        let out = apply_verdicts(
            doc,
            &plan,
            &[verdict("Acme bullet 1", VerdictKind::Revert, None)],
        );
        assert_eq!(out, "### Acme\n- Built X\n");
    }

    #[test]
    fn test_revert_is_noop_for_add_and_remove() {
        let doc = "### Acme\n- Shipped Z\n";
        let plan = plan(vec![
            op(EditKind::Add, "Acme, after bullet 1", "", "Shipped Z"),
            op(EditKind::Remove, "Acme bullet 2", "Led Y", ""),
        ]);
        let out = apply_verdicts(
            doc,
            &plan,
            &[
                verdict("Acme, after bullet 1", VerdictKind::Revert, None),
                verdict("Acme bullet 2", VerdictKind::Revert, None),
            ],
        );
        assert_eq!(out, doc, "revert on add/remove is a defined no-op");
    }

    #[test]
    fn test_verdict_for_unknown_target_changes_nothing() {
        // The verdict names a string that appears in the document but belongs
        // to no operation — zero additional changes.
        let doc = "### Acme\n- Architected X\n- Led Y\n";
        let plan = plan(vec![op(
            EditKind::Replace,
            "Acme bullet 1",
            "Built X",
            "Architected X",
        )]);
        let out = apply_verdicts(
            doc,
            &plan,
            &[verdict("Globex bullet 3", VerdictKind::Soften, Some("Led Y"))],
        );
        assert_eq!(out, doc);
    }

    #[test]
    fn test_soften_touches_only_the_operation_span() {
        // "Led Y" appears twice; only the span equal to the op's
        // proposed_text may change, and only its first occurrence.
        let doc = "### Acme\n- Architected X\n- Led Y\n### Globex\n- Led Y\n";
        let plan = plan(vec![op(
            EditKind::Replace,
            "Acme bullet 1",
            "Built X",
            "Architected X",
        )]);
        let out = apply_verdicts(
            doc,
            &plan,
            &[verdict(
                "Acme bullet 1",
                VerdictKind::Soften,
                Some("Helped architect X"),
            )],
        );
        assert_eq!(out, "### Acme\n- Helped architect X\n- Led Y\n### Globex\n- Led Y\n");
    }
}
