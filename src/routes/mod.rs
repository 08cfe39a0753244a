pub mod candidates;
pub mod form;
pub mod health;
pub mod scoring;
