pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::{Candidate, CandidateUpdate, CandidateWithJob, NewCandidate};
use crate::models::job::Job;

/// Record-store contract for candidates. The dispatcher and the handlers
/// depend on this abstraction, never on a concrete store.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    async fn create(&self, new: NewCandidate) -> Result<Candidate>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Candidate>>;
    /// Earliest-created match; email is not unique at the storage layer.
    async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>>;
    async fn find_by_phone_normalized(&self, phone_normalized: &str)
        -> Result<Option<Candidate>>;
    /// Batch selection for the scoring dispatcher: no score yet, still
    /// pending. Order beyond the filter is unspecified.
    async fn find_pending_unscored(&self, limit: i64) -> Result<Vec<Candidate>>;
    /// Candidates on HR hold together with their job, newest first.
    async fn list_held(&self) -> Result<Vec<CandidateWithJob>>;
    /// All candidates whose job belongs to the team, newest first.
    async fn list_by_team(&self, team: &str) -> Result<Vec<CandidateWithJob>>;
    async fn update(&self, id: Uuid, patch: CandidateUpdate) -> Result<Candidate>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Job>>;
    /// Open, non-hidden jobs for a team, newest first.
    async fn list_open_by_team(&self, team: &str) -> Result<Vec<Job>>;
}
