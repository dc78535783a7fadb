use serde::{Deserialize, Serialize};

/// Request body for the ask endpoint.
///
/// The same body is used whether the caller consumes the answer as a
/// stream or aggregates it; the service always streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    /// The user's question.
    pub question: String,

    /// Free-form system instructions forwarded to the answerer. May be
    /// empty.
    pub instructions: String,

    /// Identifier of the indexed repository to answer against.
    pub repo_identifier: String,
}

impl AskRequest {
    /// Create a new `AskRequest`.
    pub fn new(
        question: impl Into<String>,
        instructions: impl Into<String>,
        repo_identifier: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            instructions: instructions.into(),
            repo_identifier: repo_identifier.into(),
        }
    }
}

/// A fully aggregated answer from the ask endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    /// The complete answer text.
    pub answer: String,
}
