use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One file part from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Everything collected from the application form's multipart body, in the
/// order it arrived. Unknown fields without the `custom_` marker are kept in
/// `extra_fields` and ignored downstream.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_id: Option<i64>,
    pub team: Option<String>,
    pub position: Option<String>,
    pub resume: Option<UploadedFile>,
    pub extra_fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
    pub hr_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewStatusRequest {
    pub interview_status: Option<String>,
}
