use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    dto::scoring_dto::{JdCompleteRequest, JdRequest, ScoreCallbackRequest},
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/n8n/generate-jd",
    request_body = JdRequest,
    responses(
        (status = 200, description = "Generated JD text"),
        (status = 500, description = "Generator unreachable or answered in an unknown shape")
    )
)]
#[axum::debug_handler]
pub async fn generate_jd(
    State(state): State<AppState>,
    Json(payload): Json<JdRequest>,
) -> Result<impl IntoResponse> {
    let jd = state.jd_service.generate(&payload).await.map_err(|e| {
        error!("JD generation failed: {}", e);
        Error::Internal("Failed to generate JD".to_string())
    })?;

    Ok(Json(json!({ "jd": jd })))
}

#[utoipa::path(
    post,
    path = "/api/n8n/jd-complete",
    request_body = JdCompleteRequest,
    responses(
        (status = 200, description = "JD acknowledged"),
        (status = 400, description = "Missing required fields")
    )
)]
#[axum::debug_handler]
pub async fn jd_complete(Json(payload): Json<JdCompleteRequest>) -> Result<impl IntoResponse> {
    let team = payload.team.filter(|v| !v.is_empty());
    let position = payload.position.filter(|v| !v.is_empty());
    let jd = payload.jd.filter(|v| !v.is_empty());

    let (team, position, _jd) = match (team, position, jd) {
        (Some(t), Some(p), Some(j)) => (t, p, j),
        _ => return Err(Error::BadRequest("Missing required fields".to_string())),
    };

    // Acknowledged only; the dashboard attaches the JD to a job itself.
    info!("JD received for {} / {}", team, position);
    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    post,
    path = "/api/n8n/resume-score-complete",
    request_body = ScoreCallbackRequest,
    responses(
        (status = 200, description = "Score recorded"),
        (status = 400, description = "Missing identifier or status"),
        (status = 404, description = "No candidate matched the identifier")
    )
)]
#[axum::debug_handler]
pub async fn resume_score_complete(
    State(state): State<AppState>,
    Json(payload): Json<ScoreCallbackRequest>,
) -> Result<impl IntoResponse> {
    let updated = state
        .candidate_service
        .apply_score(
            payload.candidate_id,
            payload.email,
            payload.ats_score,
            payload.summary,
            payload.reason,
            payload.status,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "candidateId": updated.id,
        "email": updated.email,
        "status": updated.application_status.as_str(),
    })))
}
