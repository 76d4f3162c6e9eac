//! Library error type

/// Errors raised while reading snapshots and manifests
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} is missing required field {field}")]
    MissingField { kind: String, field: &'static str },

    #[error("Unsupported snapshot: {0}")]
    UnsupportedSnapshot(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown configuration key: {0}")]
    UnknownConfigKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;
