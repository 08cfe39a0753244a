use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::form_dto::{InterviewStatusRequest, StatusUpdateRequest, SubmissionForm, UploadedFile},
    error::Result,
    AppState,
};

pub async fn submit_application(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "name" => form.name = Some(field.text().await?),
            "email" => form.email = Some(field.text().await?),
            "phone" => form.phone = Some(field.text().await?),
            "job_id" => {
                let raw = field.text().await?;
                if let Ok(id) = raw.parse::<i64>() {
                    form.job_id = Some(id);
                }
            }
            "team" => form.team = Some(field.text().await?),
            "position" => form.position = Some(field.text().await?),
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                form.resume = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {
                let value = field.text().await?;
                form.extra_fields.push((field_name, value));
            }
        }
    }

    let candidate = state.intake_service.submit(form).await?;
    Ok(Json(json!({
        "success": true,
        "resume_url": candidate.resume_url,
    })))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse> {
    state
        .candidate_service
        .update_status(id, payload.status, payload.hr_status)
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn update_interview_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InterviewStatusRequest>,
) -> Result<impl IntoResponse> {
    let updated = state
        .candidate_service
        .update_interview_status(id, payload.interview_status)
        .await?;

    let interview_status = updated
        .interview_status
        .map(|s| s.as_str())
        .unwrap_or_default();

    Ok(Json(json!({
        "success": true,
        "message": format!("Interview status updated to {}", interview_status),
        "candidate": {
            "id": updated.id,
            "name": updated.name,
            "interview_status": interview_status,
        },
    })))
}
