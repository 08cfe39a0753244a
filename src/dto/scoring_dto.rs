use serde::{Deserialize, Serialize};

/// Callback payload from the resume scorer. `candidate_id` wins over
/// `email` when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCallbackRequest {
    pub candidate_id: Option<uuid::Uuid>,
    pub email: Option<String>,
    pub ats_score: Option<i32>,
    pub summary: Option<String>,
    pub reason: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JdRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JdCompleteRequest {
    pub team: Option<String>,
    pub position: Option<String>,
    pub jd: Option<String>,
}
