//! Helpers for lifting JSON out of free-form model responses.

use crate::errors::PromptError;
use regex::Regex;

/// Returns the JSON payload of a model response.
///
/// Tries a fenced ```json block first, then falls back to the outermost
/// `{...}` or `[...]` span. Returns the trimmed response when neither is found
/// so the caller's parser reports the failure.
pub fn extract_json_block(response: &str) -> Result<&str, PromptError> {
    let re = Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)\s*```")?;
    if let Some(inner) = re.captures(response).and_then(|caps| caps.get(1)) {
        return Ok(inner.as_str());
    }

    let start = response.find(['{', '[']);
    let end = response.rfind(['}', ']']);
    Ok(match (start, end) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => response.trim(),
    })
}
