use thiserror::Error;

/// Errors raised while producing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Deterministic report not supported by {format} reporter")]
    DeterministicNotSupported { format: &'static str },

    #[error("Unknown report format: {0}. Supported: cobertura, teamcity, lcov, json")]
    UnknownFormat(String),

    #[error("Failed to write XML: {0}")]
    Xml(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
