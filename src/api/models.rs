use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub url: Option<String>,
    /// Accepted for compatibility with the UI; every request is summarized.
    #[serde(default)]
    pub summarize: Option<bool>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
