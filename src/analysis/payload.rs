//! Validation of upstream responses.

use thiserror::Error;

use crate::llm::types::ChatCompletion;

/// The upstream call succeeded but its body could not be used.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The completion envelope itself did not decode.
    #[error("malformed completion envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    /// No choice, or a choice without text.
    #[error("completion contained no message content")]
    MissingContent,

    /// The model's text did not match the expected JSON shape.
    #[error("{0}")]
    Json(#[source] serde_json::Error),
}

/// Extract `choices[0].message.content` from a completion body.
pub fn parse_completion(body: &str) -> Result<String, PayloadError> {
    let completion: ChatCompletion = serde_json::from_str(body).map_err(PayloadError::Envelope)?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(PayloadError::MissingContent)
}

/// Remove markdown code fences (```` ``` ```` and ```` ```json ````) that
/// models sometimes wrap around JSON, then trim.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find("```") {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + 3..];
        if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            rest = &rest[4..];
        }
        rest = rest.trim_start();
    }
    out.push_str(rest);

    out.trim().to_string()
}
