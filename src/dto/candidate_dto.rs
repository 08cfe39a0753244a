use serde::{Deserialize, Serialize};

use crate::models::candidate::{Candidate, CandidateWithJob, CustomAnswers};
use crate::models::job::Job;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "jobId")]
    pub job_id: i64,
    pub resume_url: String,
    pub status: String,
    pub hr_status: Option<String>,
    pub interview_status: Option<String>,
    pub ats_score: Option<i32>,
    pub summary: Option<String>,
    pub shortlisting_reason: Option<String>,
    pub custom_answers: CustomAnswers,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Candidate> for CandidateResponse {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            email: candidate.email,
            phone: candidate.phone,
            job_id: candidate.job_id,
            resume_url: candidate.resume_url,
            status: candidate.application_status.as_str().to_string(),
            hr_status: candidate.hr_status.map(|s| s.as_str().to_string()),
            interview_status: candidate.interview_status.map(|s| s.as_str().to_string()),
            ats_score: candidate.ats_score,
            summary: candidate.summary,
            shortlisting_reason: candidate.shortlisting_reason,
            custom_answers: candidate.custom_answers,
            created_at: candidate.created_at,
            updated_at: candidate.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: i64,
    pub team: String,
    pub position: String,
    pub status: String,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            team: job.team.clone(),
            position: job.position.clone(),
            status: job.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableJobResponse {
    pub id: i64,
    pub team: String,
    pub position: String,
    pub status: String,
    pub form_link: Option<String>,
}

impl From<Job> for AvailableJobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            team: job.team,
            position: job.position,
            status: job.status.as_str().to_string(),
            form_link: job.form_link,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamCandidateResponse {
    #[serde(flatten)]
    pub candidate: CandidateResponse,
    pub job: JobSummary,
}

impl From<CandidateWithJob> for TeamCandidateResponse {
    fn from(row: CandidateWithJob) -> Self {
        Self {
            job: JobSummary::from(&row.job),
            candidate: CandidateResponse::from(row.candidate),
        }
    }
}

/// Held-candidate listing row: the candidate plus its job, with the job's
/// coordinates copied up for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldCandidateResponse {
    #[serde(flatten)]
    pub candidate: CandidateResponse,
    pub job: JobSummary,
    #[serde(rename = "originalTeam")]
    pub original_team: String,
    #[serde(rename = "originalPosition")]
    pub original_position: String,
    #[serde(rename = "originalJobId")]
    pub original_job_id: i64,
    #[serde(rename = "originalJobStatus")]
    pub original_job_status: String,
}

impl From<CandidateWithJob> for HeldCandidateResponse {
    fn from(row: CandidateWithJob) -> Self {
        Self {
            original_team: row.job.team.clone(),
            original_position: row.job.position.clone(),
            original_job_id: row.job.id,
            original_job_status: row.job.status.as_str().to_string(),
            job: JobSummary::from(&row.job),
            candidate: CandidateResponse::from(row.candidate),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveToJobRequest {
    #[serde(rename = "candidateId")]
    pub candidate_id: Option<uuid::Uuid>,
    #[serde(rename = "newJobId")]
    pub new_job_id: Option<i64>,
    pub hr_status: Option<String>,
}
