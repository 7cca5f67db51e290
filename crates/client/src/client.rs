//! Dashboard HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Every resource
//! call funnels through [`ApiClient::request`]:
//!
//! ```text
//! Sent ─┬─ 2xx ─────────────────────────────────────────▶ Done
//!       ├─ 401, retries < 2, refresh token ─▶ Refreshing ─▶ Sent'
//!       ├─ 401, retries ≥ 2 or no refresh token ─▶ TerminalFailure
//!       ├─ 403 ─────────────────────────────────────────▶ PermissionDenied
//!       └─ anything else ───────────────────────────────▶ Failed
//! ```
//!
//! Retry counts are kept per [`RequestId`], so two calls that hit an
//! expired token at the same time each get their own budget.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mentordesk_config::Settings;
use serde_json::json;

use crate::error::ClientError;
use crate::notify::{Notice, Notifier};
use crate::request::{ApiRequest, ApiResponse, RequestBody, RequestId};
use crate::session::{SessionStore, SessionUpdate};

/// Refresh-and-replay attempts allowed per request before giving up.
pub const MAX_AUTH_RETRIES: u32 = 2;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("mdesk/", env!("CARGO_PKG_VERSION"));

/// Dashboard API client (blocking).
pub struct ApiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    retries: Mutex<HashMap<RequestId, u32>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base", &self.api_base)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Removes a request's retry counter when the request settles.
struct PendingGuard<'a> {
    id: RequestId,
    retries: &'a Mutex<HashMap<RequestId, u32>>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.retries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

impl ApiClient {
    /// Create a client against `api_base` with the default timeout.
    pub fn new(
        api_base: impl Into<String>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        Self::with_timeout(api_base, DEFAULT_TIMEOUT, session, notifier)
    }

    /// Create a client from loaded settings.
    pub fn from_settings(
        settings: &Settings,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        Self::with_timeout(settings.api_base(), settings.request_timeout(), session, notifier)
    }

    pub fn with_timeout(
        api_base: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            session,
            notifier,
            retries: Mutex::new(HashMap::new()),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Number of requests currently holding a retry counter.
    pub fn pending_retry_entries(&self) -> usize {
        self.retries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    // ── Authorized request pipeline ─────────────────────────────────

    /// Send a request with the stored bearer token, recovering from an
    /// expired access token by refreshing and replaying.
    pub fn request(&self, req: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let id = RequestId::new();
        let _pending = PendingGuard { id, retries: &self.retries };
        log::debug!("[{}] {} {}", id, req.method, req.path);
        self.dispatch(id, req)
    }

    fn dispatch(&self, id: RequestId, req: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let token = self.session.access_token();
        let resp = self.send(req, token.as_deref())?;

        match resp.status {
            200..=299 => Ok(resp),
            401 => self.recover(id, req, ClientError::Unauthorized(resp.message())),
            403 => {
                log::debug!("[{}] permission denied", id);
                self.notifier.notify(Notice::PermissionDenied);
                Err(ClientError::Forbidden(resp.message()))
            }
            _ => Err(ClientError::from_status(resp.status, resp.message())),
        }
    }

    fn recover(
        &self,
        id: RequestId,
        req: &ApiRequest,
        original: ClientError,
    ) -> Result<ApiResponse, ClientError> {
        let attempts = self.retry_count(id);
        if attempts >= MAX_AUTH_RETRIES {
            log::warn!("[{}] still unauthorized after {} refreshes", id, attempts);
            self.end_session();
            return Err(original);
        }

        if self.session.refresh_token().is_none() {
            log::warn!("[{}] unauthorized and no refresh token", id);
            self.end_session();
            return Err(original);
        }

        self.bump_retry(id);
        log::debug!("[{}] refreshing session (attempt {})", id, attempts + 1);

        match self.refresh_session() {
            Ok(_) => self.dispatch(id, req),
            Err(e) => {
                log::warn!("[{}] session refresh failed: {}", id, e);
                self.end_session();
                Err(ClientError::RefreshFailed(Box::new(e)))
            }
        }
    }

    fn retry_count(&self, id: RequestId) -> u32 {
        self.retries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    fn bump_retry(&self, id: RequestId) {
        *self
            .retries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(id)
            .or_insert(0) += 1;
    }

    /// Terminal authorization failure: invalidate server side (best
    /// effort), drop local tokens, tell the user and send them to login.
    fn end_session(&self) {
        let token = self.session.access_token();
        if token.is_some() || self.session.refresh_token().is_some() {
            match self
                .send(&ApiRequest::delete("/auth/logout"), token.as_deref())
                .and_then(ApiResponse::error_for_status)
            {
                Ok(_) => log::debug!("server session invalidated"),
                Err(e) => log::warn!("server-side logout failed: {}", e),
            }
        }
        self.session.clear();
        self.notifier.notify(Notice::SessionExpired);
        self.notifier.redirect_to_login();
    }

    // ── Session operations ──────────────────────────────────────────

    /// `POST /auth/login` and store the returned tokens.
    pub fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let req = ApiRequest::post("/auth/login").json(json!({
            "email": email,
            "password": password,
        }));

        let update = self
            .send(&req, None)
            .and_then(ApiResponse::error_for_status)
            .and_then(|resp| resp.data::<SessionUpdate>())
            .map_err(|e| ClientError::AuthenticationFailed(e.to_string()))?;

        if update.access_token.is_none() {
            return Err(ClientError::AuthenticationFailed(
                "login response missing access_token".into(),
            ));
        }

        self.session.update(&update);
        log::info!("logged in as {}", email);
        self.notifier.notify(Notice::LoginSucceeded);
        Ok(())
    }

    /// `PUT /auth/refresh` with the stored refresh token.
    ///
    /// Does not go through the 401 recovery path, so a rejected refresh
    /// token surfaces directly as an error.
    pub fn refresh_session(&self) -> Result<SessionUpdate, ClientError> {
        let refresh_token = self.session.refresh_token().ok_or(ClientError::NoRefreshToken)?;
        let access_token = self.session.access_token();

        let req = ApiRequest::put("/auth/refresh").json(json!({ "token": refresh_token }));
        let resp = self.send(&req, access_token.as_deref())?.error_for_status()?;
        let update: SessionUpdate = resp.data()?;

        if update.access_token.is_none() {
            return Err(ClientError::Parse("refresh response missing access_token".into()));
        }

        self.session.update(&update);
        log::info!("session renewed");
        Ok(update)
    }

    /// `DELETE /auth/logout`, then drop local tokens regardless of the
    /// server's answer. The server error, if any, is still returned.
    pub fn logout(&self) -> Result<(), ClientError> {
        let token = self.session.access_token();
        let result = self
            .send(&ApiRequest::delete("/auth/logout"), token.as_deref())
            .and_then(ApiResponse::error_for_status);
        self.session.clear();
        result.map(|_| ())
    }

    // ── Resource helpers ────────────────────────────────────────────

    /// Report the outcome of a mutating call to the user. Failures the
    /// pipeline already announced are not announced twice.
    pub(crate) fn announce<T>(
        &self,
        result: Result<T, ClientError>,
        success: &str,
        failure: &str,
    ) -> Result<T, ClientError> {
        match &result {
            Ok(_) => self.notifier.notify(Notice::Success(success.to_string())),
            Err(e) if !e.already_notified() => {
                self.notifier.notify(Notice::Failure(failure.to_string()))
            }
            Err(_) => {}
        }
        result
    }

    // ── Transport ───────────────────────────────────────────────────

    /// One HTTP round trip. Returns the response whatever its status;
    /// only transport failures are errors here.
    fn send(&self, req: &ApiRequest, token: Option<&str>) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{}", self.api_base, req.path);
        let mut builder = self.http.request(req.method.clone(), &url);

        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match &req.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(form.to_reqwest()?),
        };

        let response = builder
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let resp = ApiResponse::from_reqwest(response)?;
        log::debug!("{} {} -> {}", req.method, req.path, resp.status);
        Ok(resp)
    }
}
