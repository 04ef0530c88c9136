pub mod domain;
pub mod genai;
pub mod infra;
pub mod observability;
