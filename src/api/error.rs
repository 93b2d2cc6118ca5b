//! Error type for the tracker REST client.
//!
//! Defines [`ApiError`] with variants for non-2xx replies, transport
//! failures and bodies that don't decode. Uses `thiserror` to derive
//! `Display` and `Error` from the `#[error(...)]` attributes.

use thiserror::Error;

/// Errors that can occur while talking to the tracker backend.
///
/// Every variant is a "network" failure from the user's point of view:
/// the request was sent (or attempted) and did not produce a usable answer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    ///
    /// `message` is the response body as received, or the HTTP reason
    /// phrase when the body was empty. It is displayed verbatim.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Transport failure underneath (DNS, connection refused, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx reply whose body is not what the endpoint documents.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code of the reply, when the backend produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_body_verbatim() {
        let err = ApiError::Status {
            status: 500,
            message: "db locked".into(),
        };
        assert_eq!(err.to_string(), "db locked");
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn decode_error_display() {
        let json_err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err = ApiError::from(json_err);
        assert!(err.to_string().starts_with("unexpected response body:"));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
    }
}
