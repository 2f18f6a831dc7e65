use thiserror::Error;

/// Type-erased error as produced by an [`HttpTransport`](crate::HttpTransport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every way a single weather lookup can fail.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The city (or configured endpoint) cannot form a request URL.
    /// No network call was made.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// No response was received. Holds the transport's own error instance.
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// The provider answered with an empty body.
    #[error("Provider returned no data")]
    NoData,

    /// The body does not have the shape of a weather report.
    #[error("Failed to decode weather report: {0}")]
    Decode(#[from] serde_json::Error),

    /// The provider answered with a non-2xx status.
    #[error("Provider request failed with status {status}: {message}")]
    Status { status: u16, message: String },
}

/// Field-less mirror of [`WeatherError`] for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    Transport,
    NoData,
    Decode,
    Status,
}

impl WeatherError {
    pub fn invalid_request<S: Into<String>>(reason: S) -> Self {
        Self::InvalidRequest { reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            WeatherError::Transport(_) => ErrorKind::Transport,
            WeatherError::NoData => ErrorKind::NoData,
            WeatherError::Decode(_) => ErrorKind::Decode,
            WeatherError::Status { .. } => ErrorKind::Status,
        }
    }
}
