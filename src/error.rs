use thiserror::Error;

/// Convenience result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Error type returned by reading, configuration and publishing functions.
///
/// Data-quality problems (unparseable dates, invalid phone numbers) are not errors; they are
/// reported as [`crate::processing::DataQualityDefect`] values alongside the transformed row.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Transport-level HTTP failure talking to the spreadsheet API.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration is syntactically valid but unusable.
    #[error("invalid config: {message}")]
    Config { message: String },

    /// The input file pattern is not a valid glob.
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The spreadsheet API rejected a request.
    #[error("sheets api error (status {status}): {message}")]
    SheetsApi { status: u16, message: String },
}
