use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{
    ApplicationStatus, Candidate, CandidateUpdate, CandidateWithJob, NewCandidate,
};
use crate::models::job::{Job, JobStatus};
use crate::repository::{CandidateRepository, JobRepository};

/// Vec-backed job store for tests and local experiments.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: Mutex<Vec<Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        self.jobs.lock().expect("job store mutex poisoned").push(job);
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Job>> {
        let jobs = self.jobs.lock().expect("job store mutex poisoned");
        Ok(jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list_open_by_team(&self, team: &str) -> Result<Vec<Job>> {
        let jobs = self.jobs.lock().expect("job store mutex poisoned");
        let mut open: Vec<Job> = jobs
            .iter()
            .filter(|j| j.team == team && j.status == JobStatus::Open && !j.hidden)
            .cloned()
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(open)
    }
}

/// Vec-backed candidate store. Holds a handle to the job store so the
/// joined listings behave like the SQL inner joins.
pub struct InMemoryCandidateRepository {
    rows: Mutex<Vec<Candidate>>,
    jobs: Arc<InMemoryJobRepository>,
}

impl InMemoryCandidateRepository {
    pub fn new(jobs: Arc<InMemoryJobRepository>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            jobs,
        }
    }

    pub fn insert(&self, candidate: Candidate) {
        self.rows
            .lock()
            .expect("candidate store mutex poisoned")
            .push(candidate);
    }

    pub fn all(&self) -> Vec<Candidate> {
        self.rows
            .lock()
            .expect("candidate store mutex poisoned")
            .clone()
    }

    fn job_for(&self, job_id: i64) -> Option<Job> {
        let jobs = self.jobs.jobs.lock().expect("job store mutex poisoned");
        jobs.iter().find(|j| j.id == job_id).cloned()
    }
}

#[async_trait]
impl CandidateRepository for InMemoryCandidateRepository {
    async fn create(&self, new: NewCandidate) -> Result<Candidate> {
        let now = Utc::now();
        let candidate = Candidate {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            phone_normalized: new.phone_normalized,
            job_id: new.job_id,
            resume_url: new.resume_url,
            application_status: ApplicationStatus::Pending,
            hr_status: None,
            interview_status: None,
            ats_score: None,
            summary: None,
            shortlisting_reason: None,
            custom_answers: new.custom_answers,
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .expect("candidate store mutex poisoned")
            .push(candidate.clone());
        Ok(candidate)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Candidate>> {
        let rows = self.rows.lock().expect("candidate store mutex poisoned");
        Ok(rows.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>> {
        let rows = self.rows.lock().expect("candidate store mutex poisoned");
        Ok(rows
            .iter()
            .filter(|c| c.email == email)
            .min_by_key(|c| c.created_at)
            .cloned())
    }

    async fn find_by_phone_normalized(
        &self,
        phone_normalized: &str,
    ) -> Result<Option<Candidate>> {
        let rows = self.rows.lock().expect("candidate store mutex poisoned");
        Ok(rows
            .iter()
            .filter(|c| c.phone_normalized == phone_normalized)
            .min_by_key(|c| c.created_at)
            .cloned())
    }

    async fn find_pending_unscored(&self, limit: i64) -> Result<Vec<Candidate>> {
        let rows = self.rows.lock().expect("candidate store mutex poisoned");
        Ok(rows
            .iter()
            .filter(|c| {
                c.ats_score.is_none() && c.application_status == ApplicationStatus::Pending
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_held(&self) -> Result<Vec<CandidateWithJob>> {
        let held: Vec<Candidate> = {
            let rows = self.rows.lock().expect("candidate store mutex poisoned");
            rows.iter()
                .filter(|c| c.hr_status == Some(crate::models::candidate::HrStatus::Hold))
                .cloned()
                .collect()
        };
        let mut joined: Vec<CandidateWithJob> = held
            .into_iter()
            .filter_map(|candidate| {
                self.job_for(candidate.job_id)
                    .map(|job| CandidateWithJob { candidate, job })
            })
            .collect();
        joined.sort_by(|a, b| b.candidate.created_at.cmp(&a.candidate.created_at));
        Ok(joined)
    }

    async fn list_by_team(&self, team: &str) -> Result<Vec<CandidateWithJob>> {
        let all: Vec<Candidate> = {
            let rows = self.rows.lock().expect("candidate store mutex poisoned");
            rows.clone()
        };
        let mut joined: Vec<CandidateWithJob> = all
            .into_iter()
            .filter_map(|candidate| {
                self.job_for(candidate.job_id)
                    .filter(|job| job.team == team)
                    .map(|job| CandidateWithJob { candidate, job })
            })
            .collect();
        joined.sort_by(|a, b| b.candidate.created_at.cmp(&a.candidate.created_at));
        Ok(joined)
    }

    async fn update(&self, id: Uuid, patch: CandidateUpdate) -> Result<Candidate> {
        let mut rows = self.rows.lock().expect("candidate store mutex poisoned");
        let candidate = rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;

        if let Some(job_id) = patch.job_id {
            candidate.job_id = job_id;
        }
        if let Some(status) = patch.application_status {
            candidate.application_status = status;
        }
        if let Some(hr) = patch.hr_status {
            candidate.hr_status = Some(hr);
        }
        if let Some(interview) = patch.interview_status {
            candidate.interview_status = Some(interview);
        }
        if let Some(score) = patch.ats_score {
            candidate.ats_score = Some(score);
        }
        if let Some(summary) = patch.summary {
            candidate.summary = Some(summary);
        }
        if let Some(reason) = patch.shortlisting_reason {
            candidate.shortlisting_reason = Some(reason);
        }
        candidate.updated_at = Utc::now();
        Ok(candidate.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::models::candidate::CustomAnswers;

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

    fn candidate(email: &str, job_id: i64, age_minutes: i64) -> Candidate {
        let created = Utc::now() - Duration::minutes(age_minutes);
        Candidate {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: email.to_string(),
            phone: "9876543210".to_string(),
            phone_normalized: "9876543210".to_string(),
            job_id,
            resume_url: "https://files.test/resume.pdf".to_string(),
            application_status: ApplicationStatus::Pending,
            hr_status: None,
            interview_status: None,
            ats_score: None,
            summary: None,
            shortlisting_reason: None,
            custom_answers: CustomAnswers::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn find_by_email_returns_earliest_created() {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let repo = InMemoryCandidateRepository::new(jobs);

        let newer = candidate("dup@test.dev", 1, 5);
        let older = candidate("dup@test.dev", 1, 60);
        let older_id = older.id;
        repo.insert(newer);
        repo.insert(older);

        let found = repo.find_by_email("dup@test.dev").await.unwrap().unwrap();
        assert_eq!(found.id, older_id);
    }

    #[tokio::test]
    async fn team_listing_joins_on_job_team() {
        let jobs = Arc::new(InMemoryJobRepository::new());
        jobs.insert(job(1, "Platform", "Backend Engineer"));
        jobs.insert(job(2, "Design", "UI Designer"));
        let repo = InMemoryCandidateRepository::new(jobs);

        repo.insert(candidate("a@test.dev", 1, 30));
        repo.insert(candidate("b@test.dev", 2, 20));
        repo.insert(candidate("c@test.dev", 1, 10));
        repo.insert(candidate("orphan@test.dev", 99, 5));

        let platform = repo.list_by_team("Platform").await.unwrap();
        assert_eq!(platform.len(), 2);
        // Newest first.
        assert_eq!(platform[0].candidate.email, "c@test.dev");
        assert_eq!(platform[1].candidate.email, "a@test.dev");
    }

    #[tokio::test]
    async fn update_patches_only_provided_fields() {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let repo = InMemoryCandidateRepository::new(jobs);
        let seeded = candidate("patch@test.dev", 1, 10);
        let id = seeded.id;
        repo.insert(seeded);

        let updated = repo
            .update(
                id,
                CandidateUpdate {
                    ats_score: Some(77),
                    summary: Some("Strong backend profile".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.ats_score, Some(77));
        assert_eq!(updated.application_status, ApplicationStatus::Pending);
        assert_eq!(updated.email, "patch@test.dev");
    }
}
