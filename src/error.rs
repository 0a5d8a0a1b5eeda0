use thiserror::Error;

/// Failures raised by the browser automation layer.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("webdriver: {0}")]
    Driver(#[from] thirtyfour::error::WebDriverError),

    #[error("required control not found: {0}")]
    MissingControl(&'static str),

    #[error("timed out after {timeout_ms}ms waiting for {what}")]
    WaitTimeout { what: &'static str, timeout_ms: u64 },
}

/// Failures raised by a sentiment classifier backend.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("classifier response carried no label")]
    MissingLabel,
}

/// Fatal failures that abort a scrape run before anything is persisted.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error("unreadable page count in pagination control: {text:?}")]
    PageCount { text: String },

    #[error("column {field} has {actual} values, expected {expected}")]
    ColumnMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}
