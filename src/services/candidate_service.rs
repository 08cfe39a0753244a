use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{
    ApplicationStatus, Candidate, CandidateUpdate, CandidateWithJob, HrStatus, InterviewStatus,
};
use crate::models::job::Job;
use crate::repository::{CandidateRepository, JobRepository};

/// Empty strings from form posts and webhook payloads mean "not provided".
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct CandidateService {
    candidates: Arc<dyn CandidateRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl CandidateService {
    pub fn new(candidates: Arc<dyn CandidateRepository>, jobs: Arc<dyn JobRepository>) -> Self {
        Self { candidates, jobs }
    }

    pub async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        self.candidates.find_by_id(id).await
    }

    /// Applies HR-driven status changes. Either field may be omitted;
    /// whatever is present must belong to the closed vocabulary.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: Option<String>,
        hr_status: Option<String>,
    ) -> Result<Candidate> {
        let candidate = self
            .candidates
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;

        let mut patch = CandidateUpdate::default();

        if let Some(raw) = present(status) {
            let parsed = ApplicationStatus::parse(&raw).ok_or_else(|| {
                Error::BadRequest(
                    r#"Invalid status. Must be "pending", "shortlisted" or "rejected""#.to_string(),
                )
            })?;
            patch.application_status = Some(parsed);
        }

        if let Some(raw) = present(hr_status) {
            let parsed = HrStatus::parse(&raw).ok_or_else(|| {
                Error::BadRequest(
                    r#"Invalid HR status. Must be "hold", "shortlisted" or "rejected""#.to_string(),
                )
            })?;
            patch.hr_status = Some(parsed);
        }

        self.candidates.update(candidate.id, patch).await
    }

    pub async fn update_interview_status(
        &self,
        id: Uuid,
        interview_status: Option<String>,
    ) -> Result<Candidate> {
        let parsed = present(interview_status)
            .and_then(|raw| InterviewStatus::parse(&raw))
            .ok_or_else(|| {
                Error::BadRequest(
                    r#"Invalid interview status. Must be "scheduled" or "taken""#.to_string(),
                )
            })?;

        let candidate = self
            .candidates
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;

        let updated = self
            .candidates
            .update(
                candidate.id,
                CandidateUpdate {
                    interview_status: Some(parsed),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            "Interview status updated for {}: {}",
            updated.name,
            parsed.as_str()
        );
        Ok(updated)
    }

    /// Applies a scorer callback. The candidate id wins when both id and
    /// email are present; the email path is kept for older scorer flows.
    /// Replayed callbacks settle on the same stored values.
    pub async fn apply_score(
        &self,
        candidate_id: Option<Uuid>,
        email: Option<String>,
        ats_score: Option<i32>,
        summary: Option<String>,
        reason: Option<String>,
        status: Option<String>,
    ) -> Result<Candidate> {
        let email = present(email);
        if candidate_id.is_none() && email.is_none() {
            return Err(Error::BadRequest(
                "candidate_id or email is required".to_string(),
            ));
        }

        let status_raw = present(status)
            .ok_or_else(|| Error::BadRequest("status is required".to_string()))?;
        let status = ApplicationStatus::parse(&status_raw).ok_or_else(|| {
            Error::BadRequest(
                r#"Invalid status. Must be "pending", "shortlisted" or "rejected""#.to_string(),
            )
        })?;

        let candidate = match candidate_id {
            Some(id) => self
                .candidates
                .find_by_id(id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Candidate with ID {} not found", id)))?,
            None => {
                let email = email.as_deref().unwrap_or_default();
                let found = self
                    .candidates
                    .find_by_email(email)
                    .await?
                    .ok_or_else(|| {
                        Error::NotFound(format!("Candidate with email {} not found", email))
                    })?;
                warn!(
                    "Using email fallback for candidate lookup. Consider using candidate_id for precision."
                );
                found
            }
        };

        let updated = self
            .candidates
            .update(
                candidate.id,
                CandidateUpdate {
                    application_status: Some(status),
                    ats_score,
                    summary,
                    shortlisting_reason: reason,
                    ..Default::default()
                },
            )
            .await?;

        info!(
            "Score recorded for candidate {}: ats_score={:?} status={}",
            updated.id,
            updated.ats_score,
            status.as_str()
        );
        Ok(updated)
    }

    pub async fn list_held(&self) -> Result<Vec<CandidateWithJob>> {
        self.candidates.list_held().await
    }

    pub async fn list_by_team(&self, team: &str) -> Result<Vec<CandidateWithJob>> {
        self.candidates.list_by_team(team).await
    }

    pub async fn available_jobs(&self, team: &str) -> Result<Vec<Job>> {
        self.jobs.list_open_by_team(team).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{CustomAnswers, NewCandidate};
    use crate::repository::memory::{InMemoryCandidateRepository, InMemoryJobRepository};

    async fn seeded_service() -> (CandidateService, Arc<InMemoryCandidateRepository>) {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let candidates = Arc::new(InMemoryCandidateRepository::new(jobs.clone()));
        let service = CandidateService::new(candidates.clone(), jobs);
        (service, candidates)
    }

    fn application(name: &str, email: &str) -> NewCandidate {
        NewCandidate {
            name: name.to_string(),
            email: email.to_string(),
            phone: "9876543210".to_string(),
            phone_normalized: "9876543210".to_string(),
            job_id: 1,
            resume_url: "https://files.test/cv.pdf".to_string(),
            custom_answers: CustomAnswers::new(),
        }
    }

    #[tokio::test]
    async fn score_callback_prefers_id_over_email() {
        let (service, candidates) = seeded_service().await;
        let by_email = candidates
            .create(application("Via Email", "shared@test.dev"))
            .await
            .unwrap();
        let by_id = candidates
            .create(application("Via Id", "other@test.dev"))
            .await
            .unwrap();

        let updated = service
            .apply_score(
                Some(by_id.id),
                Some("shared@test.dev".to_string()),
                Some(90),
                None,
                None,
                Some("shortlisted".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, by_id.id);
        let untouched = candidates.find_by_id(by_email.id).await.unwrap().unwrap();
        assert_eq!(untouched.ats_score, None);
    }

    #[tokio::test]
    async fn replayed_score_callback_settles_on_same_values() {
        let (service, candidates) = seeded_service().await;
        let created = candidates
            .create(application("Replay", "replay@test.dev"))
            .await
            .unwrap();

        for _ in 0..2 {
            service
                .apply_score(
                    Some(created.id),
                    None,
                    Some(64),
                    Some("Solid generalist".to_string()),
                    Some("Matches the stack".to_string()),
                    Some("shortlisted".to_string()),
                )
                .await
                .unwrap();
        }

        let stored = candidates.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.ats_score, Some(64));
        assert_eq!(stored.application_status, ApplicationStatus::Shortlisted);
        assert_eq!(stored.summary.as_deref(), Some("Solid generalist"));
    }

    #[tokio::test]
    async fn interview_status_outside_vocabulary_is_rejected() {
        let (service, candidates) = seeded_service().await;
        let created = candidates
            .create(application("Iva", "iva@test.dev"))
            .await
            .unwrap();

        let err = service
            .update_interview_status(created.id, Some("cancelled".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let stored = candidates.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.interview_status, None);
    }
}
