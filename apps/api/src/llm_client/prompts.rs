// Shared prompt fragments. Each service that needs LLM calls defines its
// own prompts.rs alongside it; only cross-cutting pieces live here.

/// Closing instruction appended to every structured-output prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "CRITICAL: Return ONLY valid JSON matching the schema.";

/// Reasoning budget granted to the model for analysis-grade calls.
pub const ANALYSIS_THINKING_BUDGET: u32 = 4000;
