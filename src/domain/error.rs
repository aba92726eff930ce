#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Limit reached: {0}")]
    LimitReached(String),
}

impl Error {
    pub fn bill_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "Bill",
            id: id.to_string(),
        }
    }

    pub fn expense_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "Expense",
            id: id.to_string(),
        }
    }

    pub fn participant_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "Participant",
            id: id.to_string(),
        }
    }
}
