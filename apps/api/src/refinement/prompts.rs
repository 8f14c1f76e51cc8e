// All LLM prompt constants for the improvement pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for edit planning — enforces JSON-only output.
pub const PLAN_SYSTEM: &str = "You are an expert resume editor proposing \
    minimal, surgical improvements to an already-tailored document. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Planning prompt template.
/// Replace: {evidence_instruction}, {surgical_instruction}, {document},
/// {reference}, {context}.
pub const PLAN_PROMPT_TEMPLATE: &str = r#"{evidence_instruction}

{surgical_instruction}

You are improving an existing tailored document so it better matches the target context below. Propose at most 8 edits. Touch ONLY what genuinely improves the match — everything else must remain untouched.

Return a JSON object with this EXACT schema (no extra fields):
{
  "operations": [
    {
      "type": "replace",
      "target": "Acme bullet 1",
      "current_text": "Built X",
      "proposed_text": "Architected X",
      "rationale": "Context emphasizes architecture ownership",
      "source_evidence": "Reference: sole designer of the X service"
    },
    {
      "type": "add",
      "target": "Acme, after bullet 2",
      "current_text": "",
      "proposed_text": "Shipped Z to production",
      "rationale": "Context asks for shipping experience",
      "source_evidence": "Reference: launched Z in 2024"
    },
    {
      "type": "remove",
      "target": "Acme bullet 3",
      "current_text": "Attended weekly standups",
      "proposed_text": "",
      "rationale": "No signal for the target role",
      "source_evidence": ""
    }
  ],
  "remaining_gaps": "Context asks for Kubernetes; reference has no supporting fact.",
  "unchanged_rationale": "Education section already aligns; left byte-identical."
}

Rules:
1. `type` must be exactly one of "replace", "add", "remove" — nothing else.
2. Order operations top-to-bottom as they should be applied; later operations see the document AFTER earlier ones ran.
3. For replace/remove, quote `current_text` EXACTLY as it appears in the document — character for character. Edits are applied mechanically by string matching.
4. For add, `target` must name the section and an insertion point in the form "<section>, after bullet N".
5. Every edit must be supported by the reference document via `source_evidence`, or carry an honest `rationale` for stylistic changes.
6. NEVER invent accomplishments, metrics, employers, or dates.
7. Propose between 1 and 8 operations. If nothing should change, propose the single smallest genuinely useful edit.

TARGET CONTEXT:
{context}

REFERENCE DOCUMENT (source of truth for facts):
{reference}

CURRENT DOCUMENT (edit this):
{document}"#;

/// System prompt for the batched repair call — plain text output.
pub const REPAIR_SYSTEM: &str = "You are a precise document editor. \
    You apply exactly the edits you are given and change nothing else. \
    Respond with the complete revised document text only — \
    no commentary, no code fences, no explanations.";

/// Repair prompt template. Replace: {document}, {edits}.
pub const REPAIR_PROMPT_TEMPLATE: &str = r#"The following edits could not be located mechanically in the document below. Apply each one at the spot it plainly describes, keeping every other character of the document EXACTLY as it is — same headings, same bullets, same blank lines, same indentation.

EDITS TO APPLY:
{edits}

DOCUMENT:
{document}

Return the complete revised document text and nothing else."#;

/// System prompt for the credibility audit.
pub const AUDIT_SYSTEM: &str = "You are a skeptical credibility reviewer for \
    tailored documents. You review ONLY the spans that were just edited and \
    judge whether each edit overstates what the reference document supports.";

/// Audit prompt template.
/// Replace: {document}, {pre_edit_document}, {reference}, {context},
/// {applied_edits}.
pub const AUDIT_PROMPT_TEMPLATE: &str = r#"The edits below were just applied to a tailored document. For EACH edit, decide whether its new text is credible against the reference document.

Verdicts:
- "pass": the edit is fully supported — no change.
- "soften": the edit overstates; provide `revised_text` that the reference does support. The revised text replaces the edit's `proposed_text` verbatim.
- "revert": the edit is unsupportable and should be undone. Only replace-type edits can be reverted; for add/remove edits a revert verdict is recorded but not acted on.

Return a JSON object with this EXACT schema:
{
  "verdicts": [
    {
      "target": "Acme bullet 1",
      "verdict": "soften",
      "issue": "Reference shows team contribution, not sole ownership",
      "revised_text": "Co-architected X with a team of four"
    }
  ],
  "summary": [
    "1 of 3 edits softened; ownership language exceeded the reference."
  ]
}

Rules:
1. Produce exactly one verdict per applied edit, using the edit's own `target` string.
2. Judge ONLY the edited spans. Pre-existing content is out of scope even if questionable.
3. `revised_text` is required for "soften" and must stay within what the reference supports.
4. When in doubt between pass and soften, soften. Credibility beats punch.

TARGET CONTEXT:
{context}

REFERENCE DOCUMENT (source of truth):
{reference}

DOCUMENT BEFORE EDITS:
{pre_edit_document}

DOCUMENT AFTER EDITS (current):
{document}

APPLIED EDITS:
{applied_edits}"#;
