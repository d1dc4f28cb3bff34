//! Completion request body and score extraction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Marker appended to the text so the classifier emits its score token.
pub const SCORE_PROMPT_SUFFIX: &str = "<|disc_score|>";

/// Token whose log-probability carries the score.
pub const SCORE_TOKEN: &str = "\"";

/// Allowed distance between the scaled probability and its rounding.
const INTEGER_TOLERANCE: f64 = 1e-6;

/// Errors from building or interpreting a scoring request.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The response lacks a field on the path to the score.
    #[error("Response is missing {0}")]
    MissingField(&'static str),

    /// The derived score is not an integer.
    #[error("Not an integer: {0}")]
    NotInteger(f64),

    /// Transport-level failure.
    #[error("Request failed: {0}")]
    Http(String),

    /// The API answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Body of a completion request for the text classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: u32,
    pub top_p: u32,
    pub n: u32,
    pub logprobs: u32,
    pub stop: String,
    pub stream: bool,
    pub model: String,
}

impl CompletionRequest {
    /// Build the fixed-shape request scoring `text`.
    pub fn for_text(text: &str, model: &str) -> Self {
        Self {
            prompt: format!("{}{}", text, SCORE_PROMPT_SUFFIX),
            max_tokens: 1,
            temperature: 1,
            top_p: 1,
            n: 1,
            logprobs: 5,
            stop: "\n".to_string(),
            stream: false,
            model: model.to_string(),
        }
    }
}

/// Convert the score token's log-probability to a 0–100 integer score.
pub fn score_from_logprob(logprob: f64) -> Result<u64, ScoringError> {
    let raw = 100.0 * logprob.exp();
    let rounded = raw.round();
    if !raw.is_finite() || (raw - rounded).abs() > INTEGER_TOLERANCE {
        return Err(ScoringError::NotInteger(raw));
    }
    Ok(rounded as u64)
}

/// Extract the score from a completion response.
///
/// Reads `choices[0].logprobs.top_logprobs[0]["\""]`.
pub fn extract_score(response: &Value) -> Result<u64, ScoringError> {
    let choice = response
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or(ScoringError::MissingField("choices[0]"))?;

    let top = choice
        .get("logprobs")
        .and_then(|l| l.get("top_logprobs"))
        .and_then(|t| t.get(0))
        .ok_or(ScoringError::MissingField("choices[0].logprobs.top_logprobs[0]"))?;

    let logprob = top
        .get(SCORE_TOKEN)
        .and_then(Value::as_f64)
        .ok_or(ScoringError::MissingField("top_logprobs[0][\"\\\"\"]"))?;

    score_from_logprob(logprob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_with(logprob: f64) -> Value {
        json!({
            "choices": [{
                "text": "\"",
                "logprobs": { "top_logprobs": [{ "\"": logprob, "!": -3.2 }] }
            }]
        })
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(CompletionRequest::for_text("Great food.", "model-detect-v2")).unwrap();
        assert_eq!(
            body,
            json!({
                "prompt": "Great food.<|disc_score|>",
                "max_tokens": 1,
                "temperature": 1,
                "top_p": 1,
                "n": 1,
                "logprobs": 5,
                "stop": "\n",
                "stream": false,
                "model": "model-detect-v2"
            })
        );
    }

    #[test]
    fn test_request_body_uses_integer_sampling_params() {
        let text = serde_json::to_string(&CompletionRequest::for_text("x", "m")).unwrap();
        assert!(text.contains(r#""temperature":1,"#));
        assert!(text.contains(r#""top_p":1,"#));
    }

    #[test]
    fn test_score_73() {
        assert_eq!(extract_score(&response_with(0.73f64.ln())).unwrap(), 73);
    }

    #[test]
    fn test_non_integer_rejected() {
        let err = extract_score(&response_with(0.735f64.ln())).unwrap_err();
        assert!(matches!(err, ScoringError::NotInteger(_)));
    }

    #[test]
    fn test_missing_top_logprobs() {
        let err = extract_score(&json!({ "choices": [{ "logprobs": {} }] })).unwrap_err();
        assert!(matches!(err, ScoringError::MissingField(_)));

        let err = extract_score(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, ScoringError::MissingField("choices[0]")));
    }

    #[test]
    fn test_missing_score_token() {
        let response = json!({
            "choices": [{ "logprobs": { "top_logprobs": [{ "!": -0.1 }] } }]
        });
        assert!(matches!(
            extract_score(&response),
            Err(ScoringError::MissingField(_))
        ));
    }

    #[test]
    fn test_certain_score() {
        assert_eq!(score_from_logprob(0.0).unwrap(), 100);
    }
}
