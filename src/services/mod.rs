pub mod candidate_service;
pub mod intake_service;
pub mod jd_service;
pub mod scheduler_service;
pub mod scoring_service;
pub mod storage_service;
pub mod transfer_service;
