use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateUpdate, HrStatus};
use crate::models::job::Job;
use crate::repository::{CandidateRepository, JobRepository};

/// Result of a successful transfer, with the target job for response
/// building.
pub struct TransferOutcome {
    pub candidate: Candidate,
    pub new_job: Job,
}

/// Moves candidates between jobs inside one team. Cross-team moves are
/// rejected so a team's pipeline never absorbs another team's candidates.
#[derive(Clone)]
pub struct TransferService {
    candidates: Arc<dyn CandidateRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl TransferService {
    pub fn new(candidates: Arc<dyn CandidateRepository>, jobs: Arc<dyn JobRepository>) -> Self {
        Self { candidates, jobs }
    }

    pub async fn move_to_job(
        &self,
        candidate_id: Option<Uuid>,
        new_job_id: Option<i64>,
        hr_status: Option<String>,
    ) -> Result<TransferOutcome> {
        let (candidate_id, new_job_id) = match (candidate_id, new_job_id) {
            (Some(c), Some(j)) => (c, j),
            _ => {
                return Err(Error::BadRequest(
                    "candidateId and newJobId are required".to_string(),
                ))
            }
        };

        let hr_status = match hr_status.filter(|v| !v.is_empty()) {
            Some(raw) => HrStatus::parse(&raw).ok_or_else(|| {
                Error::BadRequest(
                    r#"Invalid HR status. Must be "hold", "shortlisted" or "rejected""#.to_string(),
                )
            })?,
            None => HrStatus::Shortlisted,
        };

        let candidate = self
            .candidates
            .find_by_id(candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;

        let current_job = self
            .jobs
            .find_by_id(candidate.job_id)
            .await?
            .ok_or_else(|| {
                Error::Internal(format!(
                    "Job {} for candidate {} no longer exists",
                    candidate.job_id, candidate.id
                ))
            })?;

        let new_job = self
            .jobs
            .find_by_id(new_job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Target job not found".to_string()))?;

        if current_job.team != new_job.team {
            return Err(Error::BadRequest(
                "Cannot move candidate to a different team".to_string(),
            ));
        }

        let updated = self
            .candidates
            .update(
                candidate.id,
                CandidateUpdate {
                    job_id: Some(new_job.id),
                    hr_status: Some(hr_status),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            "Candidate {} moved from job {} to job {} as {}",
            updated.id,
            current_job.id,
            new_job.id,
            hr_status.as_str()
        );

        Ok(TransferOutcome {
            candidate: updated,
            new_job,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{CustomAnswers, NewCandidate};
    use crate::models::job::JobStatus;
    use crate::repository::memory::{InMemoryCandidateRepository, InMemoryJobRepository};
    use chrono::Utc;

    fn job(id: i64, team: &str, position: &str) -> Job {
        let now = Utc::now();
        Job {
            id,
            team: team.to_string(),
            position: position.to_string(),
            status: JobStatus::Open,
            hidden: false,
            form_link: None,
            jd: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seed() -> (TransferService, Arc<InMemoryCandidateRepository>, Uuid) {
        let jobs = Arc::new(InMemoryJobRepository::new());
        jobs.insert(job(1, "Platform", "Backend Engineer"));
        jobs.insert(job(2, "Platform", "SRE"));
        jobs.insert(job(3, "Design", "UI Designer"));

        let candidates = Arc::new(InMemoryCandidateRepository::new(jobs.clone()));
        let created = candidates
            .create(NewCandidate {
                name: "Asha Rao".to_string(),
                email: "asha@test.dev".to_string(),
                phone: "9876543210".to_string(),
                phone_normalized: "9876543210".to_string(),
                job_id: 1,
                resume_url: "https://files.test/cv.pdf".to_string(),
                custom_answers: CustomAnswers::new(),
            })
            .await
            .unwrap();

        let service = TransferService::new(candidates.clone(), jobs);
        (service, candidates, created.id)
    }

    #[tokio::test]
    async fn moves_within_team_and_defaults_to_shortlisted() {
        let (service, candidates, id) = seed().await;

        let outcome = service.move_to_job(Some(id), Some(2), None).await.unwrap();
        assert_eq!(outcome.new_job.position, "SRE");
        assert_eq!(outcome.candidate.job_id, 2);
        assert_eq!(outcome.candidate.hr_status, Some(HrStatus::Shortlisted));

        let stored = candidates.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.job_id, 2);
    }

    #[tokio::test]
    async fn cross_team_move_is_rejected_and_changes_nothing() {
        let (service, candidates, id) = seed().await;

        let err = service.move_to_job(Some(id), Some(3), None).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let stored = candidates.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.job_id, 1);
        assert_eq!(stored.hr_status, None);
    }

    #[tokio::test]
    async fn missing_target_job_is_a_not_found() {
        let (service, _candidates, id) = seed().await;

        let err = service.move_to_job(Some(id), Some(42), None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
