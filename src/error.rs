use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No header row containing a \"Date\" column found in the grid")]
    NoHeaderRow,

    #[error("Could not find a metric column. Available headers: {}", .headers.join(", "))]
    NoMetricColumn { headers: Vec<String> },

    #[error("Could not find column for metric \"{metric}\". Available headers: {}", .headers.join(", "))]
    MetricNotFound {
        metric: String,
        headers: Vec<String>,
    },

    #[error("No valid data rows found: every row was empty, malformed, or a summary row")]
    NoValidRows,

    #[error("Unknown series id: {0}")]
    UnknownSeries(u64),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
