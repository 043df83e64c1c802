//! Command-line handling for `mpd-notify`.
//!
//! The only accepted argument is an optional `daemonize`.

/// How the notifier should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stay attached to the terminal; Ctrl-C exits.
    Foreground,
    /// Detach from the terminal and session before polling.
    Daemonize,
}

/// Anything other than no argument or `daemonize`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Usage: {program} [daemonize]")]
pub struct UsageError {
    program: String,
}

/// Parse `std::env::args()`-style arguments (program name first).
pub fn parse_args<I>(args: I) -> Result<Mode, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let program = args.next().unwrap_or_else(|| "mpd-notify".into());
    let rest: Vec<String> = args.collect();
    match rest.as_slice() {
        [] => Ok(Mode::Foreground),
        [arg] if arg == "daemonize" => Ok(Mode::Daemonize),
        _ => Err(UsageError { program }),
    }
}
