//! MVV client error types.

/// Errors from the MVV HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum MvvError {
    /// Transport failure: connect, timeout, TLS, body read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status from the MVV site
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body carried a non-empty `error` field
    #[error("provider error: {0}")]
    Provider(String),

    /// JSON deserialization failed; `body` holds the head of the payload
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The request semaphore was closed
    #[error("request limiter closed")]
    LimiterClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MvvError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = MvvError::Provider("stop not found".into());
        assert_eq!(err.to_string(), "provider error: stop not found");

        let err = MvvError::Json {
            message: "expected string".into(),
            body: Some("{}".into()),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected string");
    }
}
