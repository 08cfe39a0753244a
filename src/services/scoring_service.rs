use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::models::candidate::CustomAnswers;
use crate::repository::{CandidateRepository, JobRepository};

/// Label of the relocation question as it appears on the application form.
pub const RELOCATION_ANSWER_LABEL: &str = "Willing to relocate to Pune";

/// Placeholder sent when a candidate never answered the relocation question.
const MISSING_ANSWER_SENTINEL: &str = "Error";

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRequest {
    pub resume_url: String,
    pub jd: Option<String>,
    pub name: String,
    pub email: String,
    pub willing_to_relocate: String,
}

fn relocation_answer(answers: &CustomAnswers) -> String {
    answers
        .get(RELOCATION_ANSWER_LABEL)
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING_ANSWER_SENTINEL)
        .to_string()
}

/// Fire-and-forget client for the external resume scorer. Results come back
/// later through the score callback endpoint.
#[derive(Clone)]
pub struct ScorerClient {
    client: Client,
    webhook_url: Option<String>,
}

impl ScorerClient {
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client for resume scorer");

        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());

        if let Some(ref url) = webhook_url {
            info!("Resume scoring enabled, webhook URL: {}", url);
        } else {
            info!("Resume scoring disabled (SCORER_WEBHOOK_URL not set or empty)");
        }

        Self { client, webhook_url }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub async fn score_resume(&self, payload: &ScoreRequest) -> std::result::Result<(), String> {
        let webhook_url = match &self.webhook_url {
            Some(url) => url,
            None => return Ok(()),
        };

        let response = self
            .client
            .post(webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Scorer webhook failed with status {}: {}", status, body);
            return Err(format!("HTTP error {}: {}", status, body));
        }

        Ok(())
    }
}

/// What a single dispatch run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub selected: usize,
    pub dispatched: usize,
    pub skipped: usize,
}

/// Selects unscored pending candidates in batches and sends each to the
/// scorer. One bad candidate never aborts the rest of the batch.
pub struct ScoringDispatcher {
    candidates: Arc<dyn CandidateRepository>,
    jobs: Arc<dyn JobRepository>,
    scorer: ScorerClient,
    batch_size: i64,
}

impl ScoringDispatcher {
    pub fn new(
        candidates: Arc<dyn CandidateRepository>,
        jobs: Arc<dyn JobRepository>,
        scorer: ScorerClient,
        batch_size: i64,
    ) -> Self {
        Self {
            candidates,
            jobs,
            scorer,
            batch_size,
        }
    }

    pub async fn run_once(&self) -> Result<DispatchSummary> {
        if !self.scorer.is_enabled() {
            warn!("Resume scorer webhook not configured; skipping dispatch run");
            return Ok(DispatchSummary::default());
        }

        let batch = self.candidates.find_pending_unscored(self.batch_size).await?;
        let mut summary = DispatchSummary {
            selected: batch.len(),
            ..Default::default()
        };

        for candidate in batch {
            let job = match self.jobs.find_by_id(candidate.job_id).await {
                Ok(Some(job)) => job,
                Ok(None) => {
                    warn!(
                        "Skipping candidate {}: job {} no longer exists",
                        candidate.id, candidate.job_id
                    );
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!(
                        "Skipping candidate {}: job {} lookup failed: {}",
                        candidate.id, candidate.job_id, e
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            if !candidate.resume_url.starts_with("http") {
                warn!(
                    "Skipping candidate {}: resume URL {} is not absolute",
                    candidate.id, candidate.resume_url
                );
                summary.skipped += 1;
                continue;
            }

            let payload = ScoreRequest {
                resume_url: candidate.resume_url.clone(),
                jd: job.jd.clone(),
                name: candidate.name.clone(),
                email: candidate.email.clone(),
                willing_to_relocate: relocation_answer(&candidate.custom_answers),
            };

            match self.scorer.score_resume(&payload).await {
                Ok(()) => {
                    info!("Dispatched candidate {} for scoring", candidate.id);
                    summary.dispatched += 1;
                }
                Err(e) => {
                    error!("Scoring dispatch failed for candidate {}: {}", candidate.id, e);
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "Scoring run finished: {} selected, {} dispatched, {} skipped",
            summary.selected, summary.dispatched, summary.skipped
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relocation_answer_falls_back_to_sentinel() {
        let mut answers = CustomAnswers::new();
        assert_eq!(relocation_answer(&answers), "Error");

        answers.set(RELOCATION_ANSWER_LABEL.to_string(), String::new());
        assert_eq!(relocation_answer(&answers), "Error");

        answers.set(RELOCATION_ANSWER_LABEL.to_string(), "Yes".to_string());
        assert_eq!(relocation_answer(&answers), "Yes");
    }

    #[test]
    fn disabled_scorer_reports_not_enabled() {
        assert!(!ScorerClient::new(None).is_enabled());
        assert!(!ScorerClient::new(Some("   ".to_string())).is_enabled());
        assert!(ScorerClient::new(Some("https://scorer.test/hook".to_string())).is_enabled());
    }
}
