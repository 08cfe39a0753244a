use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use validator::ValidateEmail;

use crate::dto::form_dto::SubmissionForm;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CustomAnswers, NewCandidate};
use crate::repository::{CandidateRepository, JobRepository};
use crate::services::storage_service::ResumeStorage;
use crate::utils::phone::validate_phone;
use crate::utils::slug::resume_filename;

pub const ALLOWED_RESUME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const MAX_RESUME_BYTES: usize = 2 * 1024 * 1024;

fn required(value: &Option<String>, message: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(Error::BadRequest(message.to_string())),
    }
}

/// Validates a form submission and persists the candidate once the resume
/// is safely stored. A candidate row is never written without a resume URL.
#[derive(Clone)]
pub struct IntakeService {
    candidates: Arc<dyn CandidateRepository>,
    jobs: Arc<dyn JobRepository>,
    storage: Arc<dyn ResumeStorage>,
}

impl IntakeService {
    pub fn new(
        candidates: Arc<dyn CandidateRepository>,
        jobs: Arc<dyn JobRepository>,
        storage: Arc<dyn ResumeStorage>,
    ) -> Self {
        Self {
            candidates,
            jobs,
            storage,
        }
    }

    pub async fn submit(&self, form: SubmissionForm) -> Result<Candidate> {
        let name = required(&form.name, "Name is required")?;
        let email = required(&form.email, "Email is required")?;
        if !email.validate_email() {
            return Err(Error::BadRequest("Invalid email address".to_string()));
        }

        let phone = form.phone.unwrap_or_default();
        let phone_check = validate_phone(&phone);
        if !phone_check.valid {
            let message = phone_check.error.unwrap_or("Invalid phone number");
            return Err(Error::BadRequest(message.to_string()));
        }

        let job_id = form
            .job_id
            .ok_or_else(|| Error::BadRequest("Job ID is required".to_string()))?;

        let file = form
            .resume
            .ok_or_else(|| Error::BadRequest("No resume file uploaded".to_string()))?;
        if !ALLOWED_RESUME_TYPES.contains(&file.content_type.as_str()) {
            return Err(Error::BadRequest("Please upload a PDF/DOC/DOCX.".to_string()));
        }
        if file.data.len() > MAX_RESUME_BYTES {
            return Err(Error::PayloadTooLarge(
                "File too large. Max allowed size is 2 MB.".to_string(),
            ));
        }

        // The job is checked before the upload so a rejected submission
        // never stores a file.
        if self.jobs.find_by_id(job_id).await?.is_none() {
            return Err(Error::NotFound("Job not found".to_string()));
        }

        if let Some(existing) = self
            .candidates
            .find_by_phone_normalized(&phone_check.normalized)
            .await?
        {
            warn!(
                "Phone {} already belongs to candidate {}; accepting duplicate submission",
                phone_check.normalized, existing.id
            );
        }

        let filename = resume_filename(
            &name,
            form.position.as_deref().unwrap_or(""),
            &file.filename,
            Utc::now(),
        );

        let resume_url = match self
            .storage
            .upload(file.data, &filename, &file.content_type)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                error!("Resume upload failed for {}: {}", filename, e);
                return Err(Error::Upstream(
                    "Resume upload failed. Please try again.".to_string(),
                ));
            }
        };

        let new = NewCandidate {
            name,
            email,
            phone,
            phone_normalized: phone_check.normalized,
            job_id,
            resume_url,
            custom_answers: CustomAnswers::from_form_fields(form.extra_fields),
        };

        match self.candidates.create(new).await {
            Ok(candidate) => {
                info!(
                    "Candidate {} applied for job {} (resume {})",
                    candidate.id, job_id, filename
                );
                Ok(candidate)
            }
            Err(e) => {
                error!(
                    "Failed to persist candidate after resume upload ({} is now orphaned): {}",
                    filename, e
                );
                Err(Error::Internal("Submission failed".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{Job, JobStatus};
    use crate::repository::memory::{InMemoryCandidateRepository, InMemoryJobRepository};
    use crate::services::storage_service::MockResumeStorage;
    use bytes::Bytes;

    fn seed_job(jobs: &InMemoryJobRepository, id: i64) {
        let now = Utc::now();
        jobs.insert(Job {
            id,
            team: "Platform".to_string(),
            position: "Backend Engineer".to_string(),
            status: JobStatus::Open,
            hidden: false,
            form_link: None,
            jd: Some("Build services".to_string()),
            created_at: now,
            updated_at: now,
        });
    }

    fn form(job_id: i64) -> SubmissionForm {
        SubmissionForm {
            name: Some("Asha Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            phone: Some("+91 98765-43210".to_string()),
            job_id: Some(job_id),
            team: Some("Platform".to_string()),
            position: Some("Backend Engineer".to_string()),
            resume: Some(crate::dto::form_dto::UploadedFile {
                filename: "Asha_Resume.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                data: Bytes::from_static(b"%PDF-1.4 resume"),
            }),
            extra_fields: vec![(
                "custom_Willing to relocate to Pune".to_string(),
                "Yes".to_string(),
            )],
        }
    }

    #[tokio::test]
    async fn upload_receives_derived_filename_and_declared_type() {
        let jobs = Arc::new(InMemoryJobRepository::new());
        seed_job(&jobs, 7);
        let candidates = Arc::new(InMemoryCandidateRepository::new(jobs.clone()));

        let mut storage = MockResumeStorage::new();
        storage
            .expect_upload()
            .withf(|_, filename, content_type| {
                filename.starts_with("asha-rao-backend-engineer-")
                    && filename.ends_with(".pdf")
                    && content_type == "application/pdf"
            })
            .times(1)
            .returning(|_, _, _| Ok("https://files.test/asha.pdf".to_string()));

        let service = IntakeService::new(candidates.clone(), jobs, Arc::new(storage));
        let candidate = service.submit(form(7)).await.unwrap();

        assert_eq!(candidate.resume_url, "https://files.test/asha.pdf");
        assert_eq!(candidate.phone_normalized, "9876543210");
        assert_eq!(
            candidate.custom_answers.get("Willing to relocate to Pune"),
            Some("Yes")
        );
        assert_eq!(candidates.all().len(), 1);
    }

    #[tokio::test]
    async fn upload_failure_leaves_no_candidate_behind() {
        let jobs = Arc::new(InMemoryJobRepository::new());
        seed_job(&jobs, 7);
        let candidates = Arc::new(InMemoryCandidateRepository::new(jobs.clone()));

        let mut storage = MockResumeStorage::new();
        storage
            .expect_upload()
            .times(1)
            .returning(|_, _, _| Err(Error::Upstream("unreachable".to_string())));

        let service = IntakeService::new(candidates.clone(), jobs, Arc::new(storage));
        let err = service.submit(form(7)).await.unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
        assert!(candidates.all().is_empty());
    }

    #[tokio::test]
    async fn missing_job_is_rejected_before_storage_is_touched() {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let candidates = Arc::new(InMemoryCandidateRepository::new(jobs.clone()));

        let storage = MockResumeStorage::new(); // no expectations: must not be called

        let service = IntakeService::new(candidates.clone(), jobs, Arc::new(storage));
        let err = service.submit(form(99)).await.unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert!(candidates.all().is_empty());
    }
}
