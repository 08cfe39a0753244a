use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{
    ApplicationStatus, Candidate, CandidateUpdate, CandidateWithJob, CustomAnswers, HrStatus,
    InterviewStatus, NewCandidate,
};
use crate::models::job::{Job, JobStatus};
use crate::repository::{CandidateRepository, JobRepository};

// custom_answers is selected as ::text so the JSON document (and with it the
// answer order) round-trips untouched.
const CANDIDATE_COLUMNS: &str = r#"
    c.id, c.name, c.email, c.phone, c.phone_normalized, c.job_id,
    c.resume_url, c.application_status, c.hr_status, c.interview_status,
    c.ats_score, c.summary, c.shortlisting_reason,
    c.custom_answers::text AS custom_answers, c.created_at, c.updated_at
"#;

const JOB_COLUMNS: &str = r#"
    j.id AS j_id, j.team AS j_team, j.position AS j_position,
    j.status AS j_status, j.hidden AS j_hidden, j.form_link AS j_form_link,
    j.jd AS j_jd, j.created_at AS j_created_at, j.updated_at AS j_updated_at
"#;

fn candidate_from_row(row: &PgRow) -> Result<Candidate> {
    let status_raw: String = row.try_get("application_status")?;
    let application_status = ApplicationStatus::parse(&status_raw).ok_or_else(|| {
        Error::Internal(format!("Unknown application status in store: {}", status_raw))
    })?;

    let hr_raw: Option<String> = row.try_get("hr_status")?;
    let hr_status = match hr_raw {
        Some(s) => Some(
            HrStatus::parse(&s)
                .ok_or_else(|| Error::Internal(format!("Unknown HR status in store: {}", s)))?,
        ),
        None => None,
    };

    let interview_raw: Option<String> = row.try_get("interview_status")?;
    let interview_status = match interview_raw {
        Some(s) => Some(InterviewStatus::parse(&s).ok_or_else(|| {
            Error::Internal(format!("Unknown interview status in store: {}", s))
        })?),
        None => None,
    };

    let answers_raw: String = row.try_get("custom_answers")?;
    let custom_answers: CustomAnswers = serde_json::from_str(&answers_raw)?;

    Ok(Candidate {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        phone_normalized: row.try_get("phone_normalized")?,
        job_id: row.try_get("job_id")?,
        resume_url: row.try_get("resume_url")?,
        application_status,
        hr_status,
        interview_status,
        ats_score: row.try_get("ats_score")?,
        summary: row.try_get("summary")?,
        shortlisting_reason: row.try_get("shortlisting_reason")?,
        custom_answers,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn job_from_row(row: &PgRow) -> Result<Job> {
    let status_raw: String = row.try_get("status")?;
    let status = JobStatus::parse(&status_raw)
        .ok_or_else(|| Error::Internal(format!("Unknown job status in store: {}", status_raw)))?;

    Ok(Job {
        id: row.try_get("id")?,
        team: row.try_get("team")?,
        position: row.try_get("position")?,
        status,
        hidden: row.try_get("hidden")?,
        form_link: row.try_get("form_link")?,
        jd: row.try_get("jd")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn job_from_joined_row(row: &PgRow) -> Result<Job> {
    let status_raw: String = row.try_get("j_status")?;
    let status = JobStatus::parse(&status_raw)
        .ok_or_else(|| Error::Internal(format!("Unknown job status in store: {}", status_raw)))?;

    Ok(Job {
        id: row.try_get("j_id")?,
        team: row.try_get("j_team")?,
        position: row.try_get("j_position")?,
        status,
        hidden: row.try_get("j_hidden")?,
        form_link: row.try_get("j_form_link")?,
        jd: row.try_get("j_jd")?,
        created_at: row.try_get("j_created_at")?,
        updated_at: row.try_get("j_updated_at")?,
    })
}

#[derive(Clone)]
pub struct PgCandidateRepository {
    pool: PgPool,
}

impl PgCandidateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateRepository for PgCandidateRepository {
    async fn create(&self, new: NewCandidate) -> Result<Candidate> {
        let answers_json = serde_json::to_string(&new.custom_answers)?;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO candidates AS c
                (id, name, email, phone, phone_normalized, job_id, resume_url,
                 application_status, custom_answers)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::json)
            RETURNING {CANDIDATE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.phone_normalized)
        .bind(new.job_id)
        .bind(&new.resume_url)
        .bind(ApplicationStatus::Pending.as_str())
        .bind(&answers_json)
        .fetch_one(&self.pool)
        .await?;

        candidate_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Candidate>> {
        let row = sqlx::query(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates c WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(candidate_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS} FROM candidates c
            WHERE c.email = $1
            ORDER BY c.created_at ASC
            LIMIT 1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(candidate_from_row).transpose()
    }

    async fn find_by_phone_normalized(
        &self,
        phone_normalized: &str,
    ) -> Result<Option<Candidate>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS} FROM candidates c
            WHERE c.phone_normalized = $1
            ORDER BY c.created_at ASC
            LIMIT 1
            "#
        ))
        .bind(phone_normalized)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(candidate_from_row).transpose()
    }

    async fn find_pending_unscored(&self, limit: i64) -> Result<Vec<Candidate>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS} FROM candidates c
            WHERE c.ats_score IS NULL AND c.application_status = 'pending'
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(candidate_from_row).collect()
    }

    async fn list_held(&self) -> Result<Vec<CandidateWithJob>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}, {JOB_COLUMNS}
            FROM candidates c
            JOIN jobs j ON j.id = c.job_id
            WHERE c.hr_status = 'hold'
            ORDER BY c.created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CandidateWithJob {
                    candidate: candidate_from_row(row)?,
                    job: job_from_joined_row(row)?,
                })
            })
            .collect()
    }

    async fn list_by_team(&self, team: &str) -> Result<Vec<CandidateWithJob>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}, {JOB_COLUMNS}
            FROM candidates c
            JOIN jobs j ON j.id = c.job_id
            WHERE j.team = $1
            ORDER BY c.created_at DESC
            "#
        ))
        .bind(team)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CandidateWithJob {
                    candidate: candidate_from_row(row)?,
                    job: job_from_joined_row(row)?,
                })
            })
            .collect()
    }

    async fn update(&self, id: Uuid, patch: CandidateUpdate) -> Result<Candidate> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE candidates AS c SET
                job_id = COALESCE($2, job_id),
                application_status = COALESCE($3, application_status),
                hr_status = COALESCE($4, hr_status),
                interview_status = COALESCE($5, interview_status),
                ats_score = COALESCE($6, ats_score),
                summary = COALESCE($7, summary),
                shortlisting_reason = COALESCE($8, shortlisting_reason),
                updated_at = NOW()
            WHERE c.id = $1
            RETURNING {CANDIDATE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.job_id)
        .bind(patch.application_status.map(|s| s.as_str()))
        .bind(patch.hr_status.map(|s| s.as_str()))
        .bind(patch.interview_status.map(|s| s.as_str()))
        .bind(patch.ats_score)
        .bind(patch.summary)
        .bind(patch.shortlisting_reason)
        .fetch_one(&self.pool)
        .await?;

        candidate_from_row(&row)
    }
}

#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Job>> {
        let row = sqlx::query(
            r#"
            SELECT id, team, position, status, hidden, form_link, jd,
                   created_at, updated_at
            FROM jobs WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn list_open_by_team(&self, team: &str) -> Result<Vec<Job>> {
        let rows = sqlx::query(
            r#"
            SELECT id, team, position, status, hidden, form_link, jd,
                   created_at, updated_at
            FROM jobs
            WHERE team = $1 AND status = 'open' AND hidden = FALSE
            ORDER BY created_at DESC
            "#,
        )
        .bind(team)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(job_from_row).collect()
    }
}
