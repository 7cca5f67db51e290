//! Resource subcommands: thin clap wrappers over the client's typed calls.

use std::path::PathBuf;

use clap::Subcommand;
use mentordesk_client::{
    asset_url, ArticleInput, FilePart, MeetingSessionFilters, NewUser, NewUserRole, TestimonyInput,
};
use serde_json::json;

use crate::grid;
use crate::output::print_json;
use crate::{CliError, Context};

// ── Users ───────────────────────────────────────────────────────────

#[derive(Subcommand)]
pub enum UsersCommands {
    /// List all users
    List,

    /// Active mentor and student totals
    Count,

    /// Register a student (default) or mentor
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Register as a mentor instead of a student
        #[arg(long)]
        mentor: bool,

        /// Class id; repeat for mentors teaching several classes
        #[arg(long = "class", required = true)]
        classes: Vec<String>,

        /// Minimum sessions a student must attend
        #[arg(long)]
        minimal_sessions: Option<u32>,
    },

    /// Activate an account without email verification
    Activate { id: u64 },

    Delete { id: u64 },
}

pub fn cmd_users(ctx: &Context, cmd: UsersCommands) -> Result<(), CliError> {
    let client = ctx.signed_in_client()?;
    match cmd {
        UsersCommands::List => print_json(&client.list_users()?),
        UsersCommands::Count => print_json(&client.user_count()?),
        UsersCommands::Create { name, email, mentor, classes, minimal_sessions } => {
            if mentor && minimal_sessions.is_some() {
                return Err(CliError::usage("--minimal-sessions applies to students only"));
            }
            let user = NewUser {
                name,
                email,
                role: if mentor { NewUserRole::Mentor } else { NewUserRole::Student },
                classes,
                minimal_sessions,
            };
            print_json(&client.register_user(&user)?)
        }
        UsersCommands::Activate { id } => print_json(&client.force_activate_user(id)?),
        UsersCommands::Delete { id } => Ok(client.delete_user(id)?),
    }
}

// ── Meeting sessions ────────────────────────────────────────────────

#[derive(Subcommand)]
pub enum SessionsCommands {
    /// List sessions, optionally filtered
    List {
        /// Student id
        #[arg(long)]
        user: Option<String>,

        /// Mentor id
        #[arg(long)]
        mentor: Option<String>,

        /// pending, scheduled, completed or cancelled
        #[arg(long)]
        status: Option<String>,
    },

    Complete { id: u64 },

    Cancel { id: u64 },

    Delete { id: u64 },

    /// Push grid edits: changed rows become bulk updates, new rows bulk creates
    #[command(after_help = "\
Examples:
  mdesk sessions list --user 12 > before.json
  cp before.json after.json && $EDITOR after.json
  mdesk sessions sync --original before.json --edited after.json --student-id 12 --dry-run")]
    Sync {
        #[arg(long)]
        original: PathBuf,

        #[arg(long)]
        edited: PathBuf,

        /// Student the new sessions belong to
        #[arg(long)]
        student_id: u64,

        /// Tracked columns, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = grid::default_columns())]
        columns: Vec<String>,

        /// Print the plan without sending anything
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn cmd_sessions(ctx: &Context, cmd: SessionsCommands) -> Result<(), CliError> {
    match cmd {
        SessionsCommands::List { user, mentor, status } => {
            let filters = MeetingSessionFilters { user, mentor, status };
            print_json(&ctx.signed_in_client()?.list_meeting_sessions(&filters)?)
        }
        SessionsCommands::Complete { id } => {
            print_json(&ctx.signed_in_client()?.complete_meeting_session(id)?)
        }
        SessionsCommands::Cancel { id } => {
            print_json(&ctx.signed_in_client()?.cancel_meeting_session(id)?)
        }
        SessionsCommands::Delete { id } => Ok(ctx.signed_in_client()?.delete_meeting_session(id)?),
        SessionsCommands::Sync { original, edited, student_id, columns, dry_run } => {
            grid::cmd_sessions_sync(ctx, original, edited, student_id, columns, dry_run)
        }
    }
}

// ── Articles ────────────────────────────────────────────────────────

#[derive(Subcommand)]
pub enum ArticlesCommands {
    List,

    /// Publish an article from an HTML file
    Create {
        #[arg(long)]
        title: String,

        /// HTML body
        #[arg(long)]
        content_file: PathBuf,
    },

    Delete { id: u64 },
}

pub fn cmd_articles(ctx: &Context, cmd: ArticlesCommands) -> Result<(), CliError> {
    let client = ctx.signed_in_client()?;
    match cmd {
        ArticlesCommands::List => print_json(&client.list_articles()?),
        ArticlesCommands::Create { title, content_file } => {
            let content = std::fs::read_to_string(&content_file)
                .map_err(|e| CliError::io(format!("{}: {}", content_file.display(), e)))?;
            Ok(client.create_article(&ArticleInput { title, content })?)
        }
        ArticlesCommands::Delete { id } => Ok(client.delete_article(id)?),
    }
}

// ── Testimonies ─────────────────────────────────────────────────────

#[derive(Subcommand)]
pub enum TestimoniesCommands {
    List,

    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        current_position: String,

        #[arg(long)]
        previous_position: String,

        #[arg(long)]
        text: String,

        /// Portrait image
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    Delete { id: u64 },
}

pub fn cmd_testimonies(ctx: &Context, cmd: TestimoniesCommands) -> Result<(), CliError> {
    let client = ctx.signed_in_client()?;
    match cmd {
        TestimoniesCommands::List => print_json(&client.list_testimonies()?),
        TestimoniesCommands::Create { name, current_position, previous_position, text, photo } => {
            let photo = photo.as_deref().map(FilePart::from_path).transpose()?;
            let input = TestimonyInput {
                testimoner_name: name,
                testimoner_current_position: current_position,
                testimoner_previous_position: previous_position,
                testimony_text: text,
                testimoner_photo: photo,
            };
            Ok(client.create_testimony(&input)?)
        }
        TestimoniesCommands::Delete { id } => Ok(client.delete_testimony(id)?),
    }
}

// ── Static assets ───────────────────────────────────────────────────

#[derive(Subcommand)]
pub enum AssetsCommands {
    List,

    Upload { file: PathBuf },

    Delete { id: u64 },

    /// Print the public URL of a stored asset path
    Url { path: String },
}

pub fn cmd_assets(ctx: &Context, cmd: AssetsCommands) -> Result<(), CliError> {
    match cmd {
        AssetsCommands::List => print_json(&ctx.signed_in_client()?.list_static_assets()?),
        AssetsCommands::Upload { file } => {
            let part = FilePart::from_path(&file)?;
            Ok(ctx.signed_in_client()?.upload_static_asset(part)?)
        }
        AssetsCommands::Delete { id } => Ok(ctx.signed_in_client()?.delete_static_asset(id)?),
        AssetsCommands::Url { path } => {
            let base = ctx.settings()?.image_base_url.ok_or_else(|| {
                CliError::usage("No asset host configured")
                    .with_hint("set assets.baseUrl in settings or MENTORDESK_IMAGE_BASE_URL")
            })?;
            println!("{}", asset_url(&base, &path));
            Ok(())
        }
    }
}

// ── Classes ─────────────────────────────────────────────────────────

#[derive(Subcommand)]
pub enum ClassesCommands {
    List,

    /// Class options as `{value, label}` pairs
    Options,

    Create { name: String },
}

pub fn cmd_classes(ctx: &Context, cmd: ClassesCommands) -> Result<(), CliError> {
    let client = ctx.signed_in_client()?;
    match cmd {
        ClassesCommands::List => print_json(&client.list_classes()?),
        ClassesCommands::Options => print_json(&client.class_dropdown()?),
        ClassesCommands::Create { name } => {
            let created = client.create_class(&name)?;
            print_json(&json!({ "created": created }))
        }
    }
}
