pub mod candidate_dto;
pub mod form_dto;
pub mod scoring_dto;
