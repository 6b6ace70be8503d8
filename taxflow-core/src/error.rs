use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxflowError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Expected headers {expected} not found. Is this a {origin}?")]
    MissingHeaders {
        expected: String,
        origin: &'static str,
    },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Format error: {0}")]
    FmtError(#[from] std::fmt::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to open viewer: {0}")]
    ViewerError(String),
}

pub type Result<T> = std::result::Result<T, TaxflowError>;
