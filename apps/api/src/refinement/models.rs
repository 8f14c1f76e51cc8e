//! Data model for the improvement pipeline: edit plans coming back from the
//! planner call, per-operation apply results, and audit verdicts.
//!
//! Operation type is a closed enum, not a string — an unrecognized `type`
//! fails at deserialization instead of falling through at a call site.

use serde::{Deserialize, Serialize};

/// Hard cap on operations per plan. Excess operations are truncated
/// (order preserved) before Apply ever runs.
pub const MAX_PLAN_OPERATIONS: usize = 8;

/// The kind of a single edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Replace,
    Add,
    Remove,
}

/// A single externally-proposed edit.
///
/// `target` is a human-readable descriptor ("Acme bullet 1",
/// "Acme, after bullet 2"). Replace/Remove locate content by `current_text`;
/// Add parses `target` for a section and insertion ordinal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOperation {
    #[serde(rename = "type")]
    pub kind: EditKind,
    pub target: String,
    /// Expected existing content. Empty for Add.
    #[serde(default)]
    pub current_text: String,
    /// New content. Empty for Remove.
    #[serde(default)]
    pub proposed_text: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub source_evidence: String,
}

/// An ordered plan of 1–8 edit operations, created once per run and
/// immutable thereafter. `remaining_gaps` and `unchanged_rationale` are
/// free text surfaced to the caller, never consumed algorithmically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPlan {
    pub operations: Vec<EditOperation>,
    #[serde(default)]
    pub remaining_gaps: String,
    #[serde(default)]
    pub unchanged_rationale: String,
}

/// How an operation was located in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMethod {
    /// Verbatim substring match.
    Exact,
    /// Whitespace-normalized line match (marker/indentation preserved).
    Fuzzy,
    /// Rewritten wholesale by the batched repair call.
    Fallback,
}

/// Outcome of one operation. The result list always has exactly one entry
/// per plan operation, in plan order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EditKind,
    pub applied: bool,
    pub method: Option<ApplyMethod>,
    pub reason: Option<String>,
}

impl ApplyResult {
    pub fn applied(op: &EditOperation, method: ApplyMethod) -> Self {
        Self {
            target: op.target.clone(),
            kind: op.kind,
            applied: true,
            method: Some(method),
            reason: None,
        }
    }

    pub fn unresolved(op: &EditOperation, reason: &str) -> Self {
        Self {
            target: op.target.clone(),
            kind: op.kind,
            applied: false,
            method: None,
            reason: Some(reason.to_string()),
        }
    }
}

/// Audit decision for one applied edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictKind {
    Pass,
    Soften,
    Revert,
}

/// One credibility verdict, matched back to its operation by `target`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditVerdict {
    pub target: String,
    pub verdict: VerdictKind,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub revised_text: Option<String>,
}

/// Structured response of the audit collaborator call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditOutcome {
    #[serde(default)]
    pub verdicts: Vec<AuditVerdict>,
    #[serde(default)]
    pub summary: Vec<String>,
}
