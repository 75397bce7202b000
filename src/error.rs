use thiserror::Error;

#[derive(Error, Debug)]
pub enum JenkinsMcpError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job has no builds yet: {0}")]
    NoBuildsYet(String),

    #[error("Failed to look up job '{job}': {source}")]
    JobLookupFailed {
        job: String,
        #[source]
        source: Box<JenkinsMcpError>,
    },

    #[error("Not found on Jenkins: {0}")]
    NotFound(String),

    #[error("Jenkins unreachable: {0}")]
    UpstreamUnavailable(String),

    #[error("Jenkins returned status {status}: {message}")]
    UpstreamError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, JenkinsMcpError>;
