//! The narrow interface the engine sees for all generative work.
//!
//! The collaborator is inherently non-deterministic, so the engine never
//! holds `LlmClient` directly — it holds `Arc<dyn EditCollaborator>` in
//! `AppState` (same pattern as pluggable scorers elsewhere in the stack),
//! and tests substitute deterministic fakes without touching engine logic.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::prompts::{
    EVIDENCE_INSTRUCTION, JSON_ONLY_SYSTEM, SURGICAL_EDIT_INSTRUCTION,
};
use crate::llm_client::LlmClient;
use crate::refinement::models::{ApplyResult, AuditOutcome, EditOperation, EditPlan};
use crate::refinement::prompts::{
    AUDIT_PROMPT_TEMPLATE, AUDIT_SYSTEM, PLAN_PROMPT_TEMPLATE, PLAN_SYSTEM, REPAIR_PROMPT_TEMPLATE,
    REPAIR_SYSTEM,
};

/// Everything the audit call needs to review only the changed spans.
#[derive(Debug, Clone, Copy)]
pub struct AuditRequest<'a> {
    pub document: &'a str,
    pub pre_edit_document: &'a str,
    pub reference_document: &'a str,
    pub context: &'a str,
    pub plan: &'a EditPlan,
    /// Apply results paired with the plan by index; the prompt carries only
    /// the operations that were actually applied.
    pub results: &'a [ApplyResult],
}

/// The three request shapes the engine may issue, one call per phase.
#[async_trait]
pub trait EditCollaborator: Send + Sync {
    /// Propose an ordered edit plan for `document` against `reference`.
    async fn plan(
        &self,
        document: &str,
        reference: &str,
        context: &str,
    ) -> Result<EditPlan, AppError>;

    /// Rewrite `document` applying exactly the described edits.
    /// Returns the full replacement document text.
    async fn repair(&self, document: &str, descriptions: &[String]) -> Result<String, AppError>;

    /// Re-review the changed spans and return verdicts plus a summary.
    async fn audit(&self, request: AuditRequest<'_>) -> Result<AuditOutcome, AppError>;
}

/// Production collaborator: Claude via the shared `LlmClient`.
pub struct ClaudeEditCollaborator {
    llm: LlmClient,
}

impl ClaudeEditCollaborator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl EditCollaborator for ClaudeEditCollaborator {
    async fn plan(
        &self,
        document: &str,
        reference: &str,
        context: &str,
    ) -> Result<EditPlan, AppError> {
        let prompt = PLAN_PROMPT_TEMPLATE
            .replace("{evidence_instruction}", EVIDENCE_INSTRUCTION)
            .replace("{surgical_instruction}", SURGICAL_EDIT_INSTRUCTION)
            .replace("{document}", document)
            .replace("{reference}", reference)
            .replace("{context}", context);

        self.llm
            .call_json::<EditPlan>(&prompt, PLAN_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Plan LLM call failed: {e}")))
    }

    async fn repair(&self, document: &str, descriptions: &[String]) -> Result<String, AppError> {
        let edits = descriptions
            .iter()
            .enumerate()
            .map(|(i, d)| format!("{}. {}", i + 1, d))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = REPAIR_PROMPT_TEMPLATE
            .replace("{document}", document)
            .replace("{edits}", &edits);

        self.llm
            .call_text(&prompt, REPAIR_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Repair LLM call failed: {e}")))
    }

    async fn audit(&self, request: AuditRequest<'_>) -> Result<AuditOutcome, AppError> {
        let applied: Vec<&EditOperation> = request
            .plan
            .operations
            .iter()
            .zip(request.results)
            .filter(|(_, r)| r.applied)
            .map(|(op, _)| op)
            .collect();
        let applied_edits = serde_json::to_string_pretty(&applied)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize plan: {e}")))?;

        let prompt = AUDIT_PROMPT_TEMPLATE
            .replace("{document}", request.document)
            .replace("{pre_edit_document}", request.pre_edit_document)
            .replace("{reference}", request.reference_document)
            .replace("{context}", request.context)
            .replace("{applied_edits}", &applied_edits);

        let system = format!("{AUDIT_SYSTEM} {JSON_ONLY_SYSTEM}");
        self.llm
            .call_json::<AuditOutcome>(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Audit LLM call failed: {e}")))
    }
}
