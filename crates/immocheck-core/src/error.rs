use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImmoError {
    #[error("not initialized: run 'immocheck init'")]
    NotInitialized,

    #[error("unknown property: {0}")]
    UnknownProperty(String),

    #[error("no record for unit {0}")]
    RecordNotFound(String),

    #[error("no record for occupant: {0}")]
    OccupantNotFound(String),

    #[error("sheet unavailable: {0}")]
    SheetUnavailable(String),

    #[error("sheet rejected write: {0}")]
    SheetWriteRejected(String),

    #[error("secret env var '{0}' is not set")]
    MissingSecret(String),

    #[error("invalid duplicate policy '{0}': expected 'first' or 'last'")]
    InvalidDuplicatePolicy(String),

    #[error("invalid liability category: {0}")]
    InvalidLiability(String),

    #[error("missing form input: {0}")]
    MissingInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ImmoError {
    /// True for failures caused by the sheet backend being unreachable,
    /// as opposed to bad input or a local I/O problem.
    pub fn is_connectivity(&self) -> bool {
        match self {
            ImmoError::SheetUnavailable(_) => true,
            ImmoError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImmoError>;
