use thiserror::Error;

/// Failure while talking to the image host.
///
/// Errors are `Clone` so they can ride inside UI messages; transport
/// errors are flattened to their display text for that reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, TLS or timeout failure before a response arrived
    #[error("network error: {0}")]
    Network(String),

    /// The host answered with a non-success status
    #[error("image host returned HTTP {status}")]
    Status { status: u16 },

    /// The body could not be decoded as a listing
    #[error("unexpected response from image host: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            FetchError::Status { status: 404 }.to_string(),
            "image host returned HTTP 404"
        );
        let err: FetchError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
