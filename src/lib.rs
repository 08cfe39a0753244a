pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::repository::postgres::{PgCandidateRepository, PgJobRepository};
use crate::repository::{CandidateRepository, JobRepository};
use crate::services::candidate_service::CandidateService;
use crate::services::intake_service::IntakeService;
use crate::services::jd_service::JdService;
use crate::services::storage_service::{GraphStorage, LocalStorage, ResumeStorage};
use crate::services::transfer_service::TransferService;

#[derive(Clone)]
pub struct AppState {
    pub intake_service: IntakeService,
    pub candidate_service: CandidateService,
    pub transfer_service: TransferService,
    pub jd_service: JdService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Result<Self> {
        let config = crate::config::get_config();

        let candidates: Arc<dyn CandidateRepository> =
            Arc::new(PgCandidateRepository::new(pool.clone()));
        let jobs: Arc<dyn JobRepository> = Arc::new(PgJobRepository::new(pool));

        let storage: Arc<dyn ResumeStorage> = match config.storage_backend.as_str() {
            "local" => Arc::new(LocalStorage::new(
                config.uploads_dir.clone(),
                config.public_base_url.clone(),
            )),
            "onedrive" => {
                let (client_id, client_secret, tenant_id, folder_link) = match (
                    config.ms_client_id.clone(),
                    config.ms_client_secret.clone(),
                    config.ms_tenant_id.clone(),
                    config.ms_upload_folder_link.clone(),
                ) {
                    (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
                    _ => {
                        return Err(Error::Config(
                            "STORAGE_BACKEND=onedrive requires MS_CLIENT_ID, MS_CLIENT_SECRET, \
                             MS_TENANT_ID and MS_UPLOAD_FOLDER_LINK"
                                .to_string(),
                        ))
                    }
                };
                match url::Url::parse(&folder_link) {
                    Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
                    _ => {
                        return Err(Error::Config(
                            "MS_UPLOAD_FOLDER_LINK must be an HTTP(S) share link".to_string(),
                        ))
                    }
                }
                Arc::new(GraphStorage::new(client_id, client_secret, tenant_id, folder_link))
            }
            other => {
                return Err(Error::Config(format!(
                    "Unknown STORAGE_BACKEND: {} (expected \"local\" or \"onedrive\")",
                    other
                )))
            }
        };

        Ok(Self::with_parts(
            candidates,
            jobs,
            storage,
            config.jd_generator_webhook_url.clone(),
        ))
    }

    /// Assembles the state from explicit parts. Tests use this to swap in
    /// in-memory repositories and recording storage.
    pub fn with_parts(
        candidates: Arc<dyn CandidateRepository>,
        jobs: Arc<dyn JobRepository>,
        storage: Arc<dyn ResumeStorage>,
        jd_generator_url: Option<String>,
    ) -> Self {
        let intake_service = IntakeService::new(candidates.clone(), jobs.clone(), storage);
        let candidate_service = CandidateService::new(candidates.clone(), jobs.clone());
        let transfer_service = TransferService::new(candidates, jobs);
        let jd_service = JdService::new(jd_generator_url);

        Self {
            intake_service,
            candidate_service,
            transfer_service,
            jd_service,
        }
    }
}
