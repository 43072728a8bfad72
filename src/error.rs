use thiserror::Error;

#[derive(Error, Debug)]
pub enum NeuroForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session Store Error: {0}")]
    Store(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),
}

pub type NfResult<T> = Result<T, NeuroForgeError>;
