/// Client-level errors
///
/// Everything the backend or the network can do wrong ends up here. The view-model only ever
/// shows the `Display` text of an error, so variant messages are written for humans.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Network-level failure reported by the transport, shown verbatim
    #[error("{0}")]
    Transport(String),

    #[error("Backend error: {0}")]
    ExternalApi(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_displays_verbatim() {
        let err = AppError::Transport("Network down".to_string());
        assert_eq!(err.to_string(), "Network down");
    }

    #[test]
    fn test_prefixed_variants() {
        assert_eq!(
            AppError::InvalidInput("page 0".to_string()).to_string(),
            "Invalid input: page 0"
        );
        assert_eq!(
            AppError::Conflict("duplicate".to_string()).to_string(),
            "Conflict: duplicate"
        );
    }
}
