// Ollama generate API request/response types

use serde::{Deserialize, Serialize};

use super::{Answer, InferenceError};

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    /// Always false: the gateway wants one complete answer
    pub stream: bool,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            prompt,
            stream: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
    /// Set by the backend instead of `response` when generation failed
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerateResponse {
    /// Turn the decoded body into an answer.
    ///
    /// An explicit `error` or a missing `response` field means the body is
    /// not a usable answer; a blank `response` means no candidate.
    pub fn into_answer(self) -> Result<Answer, InferenceError> {
        if let Some(error) = self.error {
            return Err(InferenceError::Unavailable(format!(
                "backend reported an error: {error}"
            )));
        }

        match self.response {
            Some(text) => Ok(Answer::from_candidate(Some(text))),
            None => Err(InferenceError::Unavailable(
                "malformed backend response: missing `response` field".to_string(),
            )),
        }
    }
}
