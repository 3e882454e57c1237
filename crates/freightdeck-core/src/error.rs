use thiserror::Error;

/// All the ways things can go wrong in freightdeck
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    #[error("backend request failed: {0}")]
    Backend(String),

    /// A superseded request. Never reported to the user and never logged.
    #[error("request cancelled")]
    Cancelled,

    #[error("failed to load dashboard stats: {0}")]
    StatsFetchFailed(String),

    #[error("failed to load customers: {0}")]
    CustomersFetchFailed(String),

    #[error("failed to load bookings: {0}")]
    BookingsFetchFailed(String),

    #[error("failed to load financial summary: {0}")]
    FinancialFetchFailed(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
