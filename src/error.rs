use thiserror::Error;

use crate::synthesis::SynthesisError;

#[derive(Error, Debug)]
pub enum RepoLensError {
    #[error("Invalid GitHub repository reference: {0}")]
    InvalidReference(String),

    #[error("Could not fetch README.md from repository {0}")]
    ReadmeNotFound(String),

    #[error("Failed to clone repository {repo}: {reason}")]
    CloneFailed { repo: String, reason: String },

    #[error("Summary generation failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, RepoLensError>;
