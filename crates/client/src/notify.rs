//! User-facing notices and the login redirect.
//!
//! The client never renders anything. It reports what happened through a
//! [`Notifier`] supplied at construction; a GUI would show a toast and
//! navigate, the CLI prints to stderr, tests record the calls.

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    LoginSucceeded,
    /// Terminal authorization failure; tokens were cleared
    SessionExpired,
    /// 403 from the backend
    PermissionDenied,
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::LoginSucceeded => "Login success",
            Notice::SessionExpired => "Your session has expired, please log in again",
            Notice::PermissionDenied => "You do not have permission to perform this action",
            Notice::Success(msg) | Notice::Failure(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::SessionExpired | Notice::PermissionDenied | Notice::Failure(_)
        )
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    /// Force the user back to the login entry point.
    fn redirect_to_login(&self);
}

/// Notifier that only writes to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            log::warn!("{}", notice.message());
        } else {
            log::info!("{}", notice.message());
        }
    }

    fn redirect_to_login(&self) {
        log::info!("redirecting to login");
    }
}
