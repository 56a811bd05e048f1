//! Helpers for parsing language-model replies.

/// Strip a markdown code fence from a model reply, tolerating an optional
/// `json` language tag. Models asked for "JSON only" still fence their
/// output often enough that every JSON-parsing call site needs this.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
