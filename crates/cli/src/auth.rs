//! `mdesk login`, `mdesk logout`, `mdesk whoami`.

use std::io::{self, Write};

use crate::exit_codes::EXIT_USAGE;
use crate::output::print_json;
use crate::{CliError, Context};

pub const ENV_PASSWORD: &str = "MENTORDESK_PASSWORD";

pub fn cmd_login(ctx: &Context, email: String, password: Option<String>) -> Result<(), CliError> {
    let password = resolve_password(password)?;
    let client = ctx.client()?;
    client.login(&email, &password)?;

    let user = client.current_user()?;
    eprintln!("Authenticated as {} ({})", user.name, user.role.label());
    Ok(())
}

/// --password flag > MENTORDESK_PASSWORD env > interactive prompt
fn resolve_password(flag: Option<String>) -> Result<String, CliError> {
    if let Some(p) = flag {
        return Ok(p);
    }
    if let Some(p) = std::env::var(ENV_PASSWORD).ok().filter(|p| !p.is_empty()) {
        return Ok(p);
    }
    if !atty::is(atty::Stream::Stdin) {
        return Err(CliError {
            code: EXIT_USAGE,
            message: "No password provided and stdin is not a TTY".into(),
            hint: Some(format!("pass --password or set {}", ENV_PASSWORD)),
        });
    }

    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut buf = String::new();
    io::stdin()
        .read_line(&mut buf)
        .map_err(|e| CliError::io(e.to_string()))?;
    let password = buf.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(CliError::usage("No password provided")
            .with_hint(format!("pass --password or set {}", ENV_PASSWORD)));
    }
    Ok(password)
}

pub fn cmd_logout(ctx: &Context) -> Result<(), CliError> {
    let client = ctx.client()?;
    if !client.session().is_authenticated() {
        eprintln!("Not logged in");
        return Ok(());
    }
    match client.logout() {
        Ok(()) => eprintln!("Logged out"),
        // Local tokens are gone either way
        Err(e) => log::warn!("server logout failed: {}", e),
    }
    Ok(())
}

pub fn cmd_whoami(ctx: &Context) -> Result<(), CliError> {
    let client = ctx.signed_in_client()?;
    let user = client.current_user()?;
    print_json(&user)
}
