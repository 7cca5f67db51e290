// stdout/stderr plumbing shared by the commands.

use mentordesk_client::{Notice, Notifier};
use serde::Serialize;

use crate::CliError;

/// Pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("cannot encode output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Prints client notices on stderr so stdout stays machine-readable.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            eprintln!("warning: {}", notice.message());
        } else {
            eprintln!("{}", notice.message());
        }
    }

    fn redirect_to_login(&self) {
        eprintln!("Signed out. Run `mdesk login` to continue.");
    }
}
