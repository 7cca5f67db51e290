//! Error type for client operations.

/// Error type for API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Login was rejected or the login response was unusable
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    /// Refresh was requested but no (unexpired) refresh token is stored
    #[error("No refresh token available")]
    NoRefreshToken,
    /// 401 that could not be recovered; the session has been cleared
    #[error("Session expired (HTTP 401): {0}")]
    Unauthorized(String),
    /// The refresh call itself failed; the session has been cleared
    #[error("Failed to renew session: {0}")]
    RefreshFailed(Box<ClientError>),
    /// 403, never retried
    #[error("Permission denied (HTTP 403): {0}")]
    Forbidden(String),
    /// Server returned a validation error (400 / 422)
    #[error("{0}")]
    Validation(String),
    /// Any other non-success HTTP status
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    /// 2xx response whose envelope reports failure
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(String),
}

/// Coarse classification used by front ends to decide what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Session is gone; the user has to log in again
    TerminalAuthorization,
    /// Authenticated but not allowed
    PermissionDenied,
    /// Bad input on the caller's side
    Caller,
    /// Network, server or decoding failure
    Transport,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::AuthenticationFailed(_)
            | ClientError::NoRefreshToken
            | ClientError::Unauthorized(_)
            | ClientError::RefreshFailed(_) => ErrorKind::TerminalAuthorization,
            ClientError::Forbidden(_) => ErrorKind::PermissionDenied,
            ClientError::Validation(_) | ClientError::Io(_) => ErrorKind::Caller,
            ClientError::Http(..)
            | ClientError::Rejected(_)
            | ClientError::Network(_)
            | ClientError::Parse(_) => ErrorKind::Transport,
        }
    }

    /// True when the client already told the user about this failure
    /// (session expiry or missing permission).
    pub fn already_notified(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized(_) | ClientError::RefreshFailed(_) | ClientError::Forbidden(_)
        )
    }

    /// Map a non-success status and its extracted message to an error.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ClientError::Unauthorized(message),
            403 => ClientError::Forbidden(message),
            400 | 422 => ClientError::Validation(message),
            _ => ClientError::Http(status, message),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Parse(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(ClientError::from_status(401, "x".into()), ClientError::Unauthorized(_)));
        assert!(matches!(ClientError::from_status(403, "x".into()), ClientError::Forbidden(_)));
        assert!(matches!(ClientError::from_status(422, "x".into()), ClientError::Validation(_)));
        assert!(matches!(ClientError::from_status(500, "x".into()), ClientError::Http(500, _)));
    }

    #[test]
    fn test_kind_taxonomy() {
        let refresh = ClientError::RefreshFailed(Box::new(ClientError::Http(500, "down".into())));
        assert_eq!(refresh.kind(), ErrorKind::TerminalAuthorization);
        assert!(refresh.already_notified());
        assert_eq!(ClientError::Forbidden("no".into()).kind(), ErrorKind::PermissionDenied);
        assert_eq!(ClientError::Network("reset".into()).kind(), ErrorKind::Transport);
        assert!(!ClientError::Http(404, "missing".into()).already_notified());
    }

    #[test]
    fn test_refresh_failed_display_includes_cause() {
        let err = ClientError::RefreshFailed(Box::new(ClientError::Http(500, "boom".into())));
        assert_eq!(err.to_string(), "Failed to renew session: HTTP 500: boom");
    }
}
