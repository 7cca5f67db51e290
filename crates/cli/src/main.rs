// MentorDesk CLI - admin dashboard operations from the shell
// Output is JSON on stdout; notices, warnings and errors go to stderr.

mod auth;
mod exit_codes;
mod grid;
mod output;
mod resources;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mentordesk_client::{ApiClient, ClientError, FileTokenStore, SessionStore};
use mentordesk_config::{ConfigError, Settings};

use exit_codes::{
    client_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_INPUT_PARSE, EXIT_NOT_LOGGED_IN,
    EXIT_SUCCESS, EXIT_USAGE,
};
use output::StderrNotifier;

#[derive(Parser)]
#[command(name = "mdesk")]
#[command(about = "MentorDesk admin dashboard from the command line")]
#[command(version)]
struct Cli {
    /// API base URL (overrides settings and MENTORDESK_API_BASE_URL)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Where the session tokens are stored
    #[arg(long, global = true, env = "MENTORDESK_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Log requests and token refreshes to stderr (same as RUST_LOG=debug)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session tokens
    #[command(after_help = "\
Password resolution: --password flag > MENTORDESK_PASSWORD env > interactive prompt")]
    Login {
        #[arg(long, short = 'e')]
        email: String,

        #[arg(long)]
        password: Option<String>,
    },

    /// End the session on the server and forget the local tokens
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Manage user accounts
    #[command(subcommand)]
    Users(resources::UsersCommands),

    /// Manage mentoring sessions
    #[command(subcommand)]
    Sessions(resources::SessionsCommands),

    /// Manage blog articles
    #[command(subcommand)]
    Articles(resources::ArticlesCommands),

    /// Manage testimonies
    #[command(subcommand)]
    Testimonies(resources::TestimoniesCommands),

    /// Manage uploaded static assets
    #[command(subcommand)]
    Assets(resources::AssetsCommands),

    /// Manage student classes
    #[command(subcommand)]
    Classes(resources::ClassesCommands),

    /// Compare two JSON row files offline and print the changeset
    #[command(after_help = "\
Examples:
  mdesk diff before.json after.json
  mdesk diff before.json after.json --columns duration,note")]
    Diff {
        /// Rows as loaded (JSON array of objects)
        original: PathBuf,

        /// Rows after editing
        edited: PathBuf,

        /// Tracked columns, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = grid::default_columns())]
        columns: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context {
        api_base: cli.api_base,
        session_file: cli.session_file,
    };

    let result = match cli.command {
        Commands::Login { email, password } => auth::cmd_login(&ctx, email, password),
        Commands::Logout => auth::cmd_logout(&ctx),
        Commands::Whoami => auth::cmd_whoami(&ctx),
        Commands::Users(cmd) => resources::cmd_users(&ctx, cmd),
        Commands::Sessions(cmd) => resources::cmd_sessions(&ctx, cmd),
        Commands::Articles(cmd) => resources::cmd_articles(&ctx, cmd),
        Commands::Testimonies(cmd) => resources::cmd_testimonies(&ctx, cmd),
        Commands::Assets(cmd) => resources::cmd_assets(&ctx, cmd),
        Commands::Classes(cmd) => resources::cmd_classes(&ctx, cmd),
        Commands::Diff { original, edited, columns } => grid::cmd_diff(original, edited, columns),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Library crates log through `log`; the subscriber picks those records up.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// Shared command context
// ============================================================================

/// Global flags every command may need to build a client.
pub struct Context {
    api_base: Option<String>,
    session_file: Option<PathBuf>,
}

impl Context {
    pub fn settings(&self) -> Result<Settings, CliError> {
        let mut settings = Settings::load_from(&Settings::config_path()).map_err(CliError::config)?;
        settings.apply_env();
        if let Some(ref base) = self.api_base {
            settings.api_base_url = base.clone();
        }
        settings.validate().map_err(CliError::config)?;
        Ok(settings)
    }

    fn session_store(&self) -> Result<SessionStore, CliError> {
        let backend = match self.session_file {
            Some(ref path) => FileTokenStore::new(path),
            None => FileTokenStore::at_default_location().map_err(CliError::from)?,
        };
        Ok(SessionStore::new(backend))
    }

    /// Client with whatever session is stored (possibly none).
    pub fn client(&self) -> Result<ApiClient, CliError> {
        let settings = self.settings()?;
        let session = Arc::new(self.session_store()?);
        ApiClient::from_settings(&settings, session, Arc::new(StderrNotifier)).map_err(CliError::from)
    }

    /// Client for commands that need a signed-in user.
    pub fn signed_in_client(&self) -> Result<ApiClient, CliError> {
        let client = self.client()?;
        if !client.session().is_authenticated() {
            return Err(CliError {
                code: EXIT_NOT_LOGGED_IN,
                message: "Not logged in".into(),
                hint: Some("run `mdesk login --email <email>` first".into()),
            });
        }
        Ok(client)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT_PARSE, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        Self {
            code: EXIT_CONFIG,
            message: err.to_string(),
            hint: Some(format!("check {}", Settings::config_path().display())),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        let code = client_exit_code(&err);
        let hint = match &err {
            ClientError::Unauthorized(_) | ClientError::RefreshFailed(_) | ClientError::NoRefreshToken => {
                Some("run `mdesk login` to sign in again".to_string())
            }
            ClientError::Forbidden(_) => Some("this action needs an admin account".to_string()),
            ClientError::Network(_) => {
                Some("check --api-base / MENTORDESK_API_BASE_URL and that the backend is up".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
