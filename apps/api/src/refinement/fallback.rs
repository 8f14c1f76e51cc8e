//! RepairFallback — one batched generative request for the operations the
//! patcher could not locate mechanically.
//!
//! The call is all-or-nothing: a non-empty response replaces the working
//! document wholesale and every previously-unresolved operation is marked
//! fallback-applied; an empty or failed response leaves them unresolved.
//! There is no partial-success reporting within a single fallback call.

use tracing::{info, warn};

use crate::refinement::collaborator::EditCollaborator;
use crate::refinement::models::{ApplyMethod, ApplyResult, EditKind, EditOperation, EditPlan};

/// Plain-language restatements of the unresolved operations, paired with
/// `results` by index. Pure; the collaborator call lives in
/// [`repair_unresolved`].
pub fn describe_unresolved(plan: &EditPlan, results: &[ApplyResult]) -> Vec<String> {
    plan.operations
        .iter()
        .zip(results)
        .filter(|(_, r)| !r.applied)
        .map(|(op, _)| describe_operation(op))
        .collect()
}

fn describe_operation(op: &EditOperation) -> String {
    match op.kind {
        EditKind::Replace => format!(
            "REPLACE at \"{}\": change \"{}\" to \"{}\"",
            op.target, op.current_text, op.proposed_text
        ),
        EditKind::Add => format!(
            "ADD at \"{}\": insert a new bullet reading \"{}\"",
            op.target, op.proposed_text
        ),
        EditKind::Remove => format!(
            "REMOVE at \"{}\": delete \"{}\"",
            op.target, op.current_text
        ),
    }
}

/// Batches all unresolved operations into one repair call.
///
/// Returns the (possibly replaced) working document. On success every
/// unresolved entry in `results` flips to `applied = true, method =
/// fallback`; on failure the results are left exactly as the patcher
/// reported them.
pub async fn repair_unresolved(
    collaborator: &dyn EditCollaborator,
    document: String,
    plan: &EditPlan,
    results: &mut [ApplyResult],
) -> String {
    let descriptions = describe_unresolved(plan, results);
    if descriptions.is_empty() {
        return document;
    }

    info!(
        "Repair fallback: {} unresolved operation(s), issuing batched repair call",
        descriptions.len()
    );

    let replacement = match collaborator.repair(&document, &descriptions).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!("Repair call returned empty document; operations stay unresolved");
            return document;
        }
        Err(e) => {
            warn!("Repair call failed: {e}; operations stay unresolved");
            return document;
        }
    };

    for result in results.iter_mut().filter(|r| !r.applied) {
        result.applied = true;
        result.method = Some(ApplyMethod::Fallback);
        result.reason = None;
    }

    replacement
}
