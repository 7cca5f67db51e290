//! Dashboard API client, shared by the CLI and any other front end.
//!
//! This crate is the single source of truth for the backend wire contract:
//! login, token refresh, logout, and the users / meeting-sessions /
//! articles / testimonies / static-assets / classes resources.
//!
//! Every call goes through [`ApiClient::request`], which attaches the
//! bearer token and, on a 401, refreshes the session and replays the call
//! at most [`MAX_AUTH_RETRIES`] times before giving up.

mod client;
mod error;
mod models;
mod notify;
mod request;
mod resources;
mod session;

pub use client::{ApiClient, MAX_AUTH_RETRIES};
pub use error::{ClientError, ErrorKind};
pub use models::{
    Article, AssetType, Class, MeetingSession, Role, SelectOption, SessionStatus, StaticAsset,
    Testimony, User, UserCount,
};
pub use notify::{LogNotifier, Notice, Notifier};
pub use request::{ApiRequest, ApiResponse, FilePart, Method, MultipartForm, RequestBody, RequestId};
pub use resources::articles::{ArticleInput, ArticlePatch};
pub use resources::meeting_sessions::{MeetingSessionFilters, MeetingSessionPatch, NewMeetingSession};
pub use resources::static_assets::asset_url;
pub use resources::testimonies::TestimonyInput;
pub use resources::users::{NewUser, NewUserRole};
pub use session::{
    FileTokenStore, MemoryTokenStore, Session, SessionStore, SessionUpdate, TokenStore,
    DEFAULT_TOKEN_TTL_DAYS,
};
