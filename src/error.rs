use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Network request failed: {0}")]
    Network(String),

    #[error("Backend returned HTTP {status}")]
    Http { status: u16 },

    #[error("Malformed backend payload: {0}")]
    Decode(String),

    #[error("{message}")]
    ValidationRejected { message: String },

    #[error("A personalized video is already being generated")]
    GenerationInFlight,

    #[error("A personalized video is already available; reset before requesting another")]
    AlreadyPersonalized,

    #[error("Personalized video generation timed out after {0}s")]
    GenerationTimedOut(u64),

    #[error("Location access was denied")]
    GeolocationDenied,

    #[error("Profile store error: {0}")]
    Store(String),
}

impl FeedError {
    /// Whether the user can simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedError::Network(_)
                | FeedError::Http { .. }
                | FeedError::ValidationRejected { .. }
                | FeedError::GenerationTimedOut(_)
        )
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Decode(e.to_string())
    }
}
