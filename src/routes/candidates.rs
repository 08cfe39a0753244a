use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    dto::candidate_dto::{
        AvailableJobResponse, HeldCandidateResponse, MoveToJobRequest, TeamCandidateResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/candidates/held",
    responses(
        (status = 200, description = "Held candidates with their job info")
    )
)]
#[axum::debug_handler]
pub async fn get_held_candidates(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let held = state.candidate_service.list_held().await?;
    let rows: Vec<HeldCandidateResponse> = held.into_iter().map(Into::into).collect();
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/candidates/available-jobs/{team}",
    params(
        ("team" = String, Path, description = "Team name")
    ),
    responses(
        (status = 200, description = "Open, non-hidden jobs for the team")
    )
)]
#[axum::debug_handler]
pub async fn get_available_jobs(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<impl IntoResponse> {
    let jobs = state.candidate_service.available_jobs(&team).await?;
    let rows: Vec<AvailableJobResponse> = jobs.into_iter().map(Into::into).collect();
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/candidates/move-to-job",
    request_body = MoveToJobRequest,
    responses(
        (status = 200, description = "Candidate moved to the target job"),
        (status = 400, description = "Missing ids or cross-team move"),
        (status = 404, description = "Candidate or target job not found")
    )
)]
#[axum::debug_handler]
pub async fn move_to_job(
    State(state): State<AppState>,
    Json(payload): Json<MoveToJobRequest>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .transfer_service
        .move_to_job(payload.candidate_id, payload.new_job_id, payload.hr_status)
        .await?;

    let hr_status = outcome
        .candidate
        .hr_status
        .map(|s| s.as_str())
        .unwrap_or_default();

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Candidate moved to {} and marked as {}",
            outcome.new_job.position, hr_status
        ),
        "candidate": {
            "id": outcome.candidate.id,
            "name": outcome.candidate.name,
            "email": outcome.candidate.email,
            "newJobId": outcome.new_job.id,
            "newJobPosition": outcome.new_job.position,
            "hr_status": hr_status,
        },
    })))
}

#[utoipa::path(
    get,
    path = "/api/candidates/by-team/{team}",
    params(
        ("team" = String, Path, description = "Team name")
    ),
    responses(
        (status = 200, description = "All candidates belonging to the team's jobs")
    )
)]
#[axum::debug_handler]
pub async fn get_candidates_by_team(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<impl IntoResponse> {
    let rows = state.candidate_service.list_by_team(&team).await?;
    let rows: Vec<TeamCandidateResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(rows))
}
