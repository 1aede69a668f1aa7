use {strum_macros::Display, thiserror::Error};

/// Error kind enumeration for CoinGecko operations.
///
/// Only logged: every kind ends up as the same fallback text for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CoinGeckoErrorKind {
    /// Invalid request (HTTP 400)
    InvalidRequest,
    /// Unauthorized (HTTP 401)
    Unauthorized,
    /// Forbidden (HTTP 403)
    Forbidden,
    /// Not found (HTTP 404)
    NotFound,
    /// Timed out upstream (HTTP 408, 504)
    TimedOut,
    /// Rate limit exceeded (HTTP 429)
    RateLimitExceeded,
    /// Internal server error (HTTP 500)
    InternalServerError,
    /// Bad gateway (HTTP 502)
    BadGateway,
    /// Service unavailable (HTTP 503)
    ServiceUnavailable,
    /// Any other non-success status
    Http,
    /// Network connection failed
    NetworkConnectionFailed,
    /// Network timeout
    NetworkTimeout,
    /// Error parsing response
    Parse,
}

/// Standard error response structure for CoinGecko requests
#[derive(Debug, Error)]
#[error("{kind}: {reason}")]
pub struct CoinGeckoErrorResponse {
    /// Detailed error message
    pub reason: String,
    /// Type of error
    pub kind: CoinGeckoErrorKind,
    /// HTTP status code if available
    pub status_code: Option<u16>,
}

impl CoinGeckoErrorKind {
    /// Maps HTTP status code to our error kind
    pub fn from_status_code(status_code: u16) -> Self {
        match status_code {
            400 => Self::InvalidRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 | 504 => Self::TimedOut,
            429 => Self::RateLimitExceeded,
            500 => Self::InternalServerError,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            _ => Self::Http,
        }
    }

    /// Maps network error to our error kind
    pub fn from_network_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::NetworkTimeout
        } else if error.is_decode() || error.is_body() {
            Self::Parse
        } else {
            Self::NetworkConnectionFailed
        }
    }
}

impl CoinGeckoErrorResponse {
    pub fn network(error: reqwest::Error) -> Self {
        Self {
            kind: CoinGeckoErrorKind::from_network_error(&error),
            reason: format!("Network error: {}", error),
            status_code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(400, CoinGeckoErrorKind::InvalidRequest)]
    #[case(404, CoinGeckoErrorKind::NotFound)]
    #[case(429, CoinGeckoErrorKind::RateLimitExceeded)]
    #[case(504, CoinGeckoErrorKind::TimedOut)]
    #[case(503, CoinGeckoErrorKind::ServiceUnavailable)]
    #[case(418, CoinGeckoErrorKind::Http)]
    fn test_kind_from_status_code(#[case] status: u16, #[case] expected: CoinGeckoErrorKind) {
        assert_eq!(CoinGeckoErrorKind::from_status_code(status), expected);
    }

    #[test]
    fn test_display_uses_snake_case_kind() {
        let error = CoinGeckoErrorResponse {
            reason: "slow down".to_string(),
            kind: CoinGeckoErrorKind::RateLimitExceeded,
            status_code: Some(429),
        };

        assert_eq!(error.to_string(), "rate_limit_exceeded: slow down");
    }
}
