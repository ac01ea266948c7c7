// Shared prompt fragments. Each feature that calls the model keeps its own
// prompts.rs next to it; only cross-cutting instructions live here.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps generated narratives tied to the content the engine actually selected.
pub const CURATED_CONTENT_INSTRUCTION: &str = "\
    CRITICAL: Refer only to the skills, weeks and videos listed in the input. \
    Do NOT invent course names, URLs, certifications or time commitments \
    that are not derivable from the input. Keep every list short and concrete.";
