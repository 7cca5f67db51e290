//! Typed endpoints, one module per backend resource.
//!
//! Each module adds methods to [`ApiClient`](crate::ApiClient); every one
//! of them goes through the authorized request pipeline.

pub mod articles;
pub mod classes;
pub mod meeting_sessions;
pub mod static_assets;
pub mod testimonies;
pub mod users;

use crate::error::ClientError;
use crate::request::ApiResponse;

/// HTTP 200 with `status: "success"` in the envelope.
pub(crate) fn require_success_envelope(resp: ApiResponse) -> Result<ApiResponse, ClientError> {
    if resp.is_success_envelope() {
        Ok(resp)
    } else {
        Err(ClientError::Rejected(resp.message()))
    }
}
