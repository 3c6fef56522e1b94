// Cross-cutting prompt fragments sent with every model call.
// Task-specific prompts live next to the module that uses them.

/// System instruction that keeps the model on structured JSON output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only, matching the provided response schema. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
