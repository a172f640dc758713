use reqwest::StatusCode;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum EtlError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Schema initialization failed: {0}")]
    Schema(#[source] SqlxError),

    #[error("Missing APOD api key; set apod.api_key")]
    MissingApiKey,

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Malformed upstream payload: {0}")]
    Decode(String),

    #[error("Load failed: {0}")]
    Load(#[source] SqlxError),
}

impl EtlError {
    /// Pipeline step the error belongs to, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            EtlError::Config(_) | EtlError::Database(_) => "setup",
            EtlError::Schema(_) => "schema",
            EtlError::MissingApiKey
            | EtlError::Request(_)
            | EtlError::UpstreamStatus(_)
            | EtlError::Decode(_) => "fetch",
            EtlError::Load(_) => "load",
        }
    }
}

impl From<figment::Error> for EtlError {
    fn from(e: figment::Error) -> Self {
        EtlError::Config(Box::new(e))
    }
}

/// True when the database rejected a row because of a UNIQUE constraint.
pub fn is_unique_violation(e: &SqlxError) -> bool {
    match e {
        SqlxError::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
