use serde::Serialize;

/// Body returned for a resolved question.
#[derive(Debug, Serialize)]
pub struct SolveResponse {
    pub answer: String,
}
