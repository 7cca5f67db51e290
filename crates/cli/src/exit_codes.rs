//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `mdesk` exit codes.
//! Scripts rely on them, so codes are never renumbered.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain      | Description                                  |
//! |---------|-------------|----------------------------------------------|
//! | 0       | Universal   | Success                                      |
//! | 1       | Universal   | General error (unspecified)                  |
//! | 2       | Universal   | CLI usage error (bad args, missing file)     |
//! | 3-9     | local       | Config, input parsing, local file IO         |
//! | 10-19   | auth        | Login, session expiry, permission            |
//! | 20-29   | api         | Transport and server responses               |
//! | 30-39   | sync        | Grid diff / bulk sync                        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `client_exit_code` or the command's error handling

use mentordesk_client::ClientError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Local (3-9)
// =============================================================================

/// Settings file unreadable or invalid.
pub const EXIT_CONFIG: u8 = 3;

/// Input file is not the expected JSON shape.
pub const EXIT_INPUT_PARSE: u8 = 4;

/// Local file unreadable or unwritable (upload file, session file).
pub const EXIT_LOCAL_IO: u8 = 5;

// =============================================================================
// Auth (10-19)
// =============================================================================

/// No stored session; run `mdesk login` first.
pub const EXIT_NOT_LOGGED_IN: u8 = 10;

/// Login rejected (bad credentials or unusable response).
pub const EXIT_AUTH_FAILED: u8 = 11;

/// Session expired and could not be renewed. Tokens have been cleared.
pub const EXIT_SESSION_EXPIRED: u8 = 12;

/// Authenticated, but the account may not do this (HTTP 403).
pub const EXIT_PERMISSION_DENIED: u8 = 13;

// =============================================================================
// API (20-29)
// =============================================================================

/// Cannot reach the backend (DNS, refused, timeout, TLS).
pub const EXIT_NETWORK: u8 = 20;

/// Backend rejected the input (HTTP 400 / 422).
pub const EXIT_VALIDATION: u8 = 21;

/// Any other non-success HTTP status.
pub const EXIT_HTTP: u8 = 22;

/// 2xx response whose envelope reported failure.
pub const EXIT_REJECTED: u8 = 23;

/// Response body did not have the expected shape.
pub const EXIT_RESPONSE_PARSE: u8 = 24;

// =============================================================================
// Sync (30-39)
// =============================================================================

/// `sessions sync --dry-run` found pending changes.
/// Like `diff(1)`, a non-zero code means "differs" to scripts.
pub const EXIT_SYNC_PENDING: u8 = 30;

/// Map a client error to its exit code.
pub fn client_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::AuthenticationFailed(_) => EXIT_AUTH_FAILED,
        ClientError::NoRefreshToken
        | ClientError::Unauthorized(_)
        | ClientError::RefreshFailed(_) => EXIT_SESSION_EXPIRED,
        ClientError::Forbidden(_) => EXIT_PERMISSION_DENIED,
        ClientError::Validation(_) => EXIT_VALIDATION,
        ClientError::Http(..) => EXIT_HTTP,
        ClientError::Rejected(_) => EXIT_REJECTED,
        ClientError::Network(_) => EXIT_NETWORK,
        ClientError::Parse(_) => EXIT_RESPONSE_PARSE,
        ClientError::Io(_) => EXIT_LOCAL_IO,
    }
}
