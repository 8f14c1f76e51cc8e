// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction that pins every proposed change to verifiable source facts.
pub const EVIDENCE_INSTRUCTION: &str = "\
    CRITICAL: Every edit you propose must be traceable to the reference \
    document or carry an explicit rationale. Do NOT infer, interpolate, or \
    invent accomplishments, metrics, or dates. If the reference does not \
    support a change, do not propose it. Fill `source_evidence` with the \
    exact reference fact each edit relies on.";

/// Instruction that keeps edits surgical: untouched content must survive
/// byte-identically, so the collaborator must quote it exactly.
pub const SURGICAL_EDIT_INSTRUCTION: &str = "\
    CRITICAL: Quote `current_text` EXACTLY as it appears in the document, \
    character for character, including punctuation. Edits are applied \
    mechanically by string matching — a paraphrased quote cannot be located \
    and will be dropped. Never propose edits to content that does not need \
    to change.";
