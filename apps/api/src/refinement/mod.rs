// Document Improvement Engine.
// Implements: edit planning, deterministic patch application with fuzzy
// fallback, batched generative repair, and a scoped credibility audit.
// All LLM calls go through llm_client via the EditCollaborator trait —
// no direct Anthropic calls here.

pub mod auditor;
pub mod collaborator;
pub mod document;
pub mod engine;
pub mod fallback;
pub mod handlers;
pub mod models;
pub mod patcher;
pub mod planner;
pub mod prompts;
pub mod store;
pub mod tracker;
