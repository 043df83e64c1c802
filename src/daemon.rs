//! Classic double-fork daemonization.
//!
//! Must be called before any threads are spawned (the signal handler and
//! the D-Bus connection used for notifications both create threads).

use log::info;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DaemonizeError {
    #[error("fork #{stage} failed: {source}")]
    Fork { stage: u8, source: io::Error },
    #[error("setsid failed: {0}")]
    Setsid(io::Error),
    #[error("cannot open {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Detach from the controlling terminal.
///
/// Forks twice with a `setsid` in between, changes to `/`, clears the
/// umask, and points stdin at `/dev/null` and stdout/stderr at `log_file`
/// (appended) or `/dev/null`.  Only the grandchild returns.
pub fn daemonize(log_file: Option<&Path>) -> Result<(), DaemonizeError> {
    let null = open(Path::new("/dev/null"), false)?;
    let out = match log_file {
        Some(path) => open(path, true)?,
        None => open(Path::new("/dev/null"), true)?,
    };

    fork_and_exit_parent(1)?;

    std::env::set_current_dir("/")?;
    // SAFETY: umask and setsid have no memory-safety preconditions.
    unsafe {
        libc::umask(0);
        if libc::setsid() < 0 {
            return Err(DaemonizeError::Setsid(io::Error::last_os_error()));
        }
    }

    fork_and_exit_parent(2)?;

    redirect(&null, libc::STDIN_FILENO)?;
    redirect(&out, libc::STDOUT_FILENO)?;
    redirect(&out, libc::STDERR_FILENO)?;
    info!("detached, pid {}", std::process::id());
    Ok(())
}

fn open(path: &Path, write: bool) -> Result<File, DaemonizeError> {
    let mut opts = OpenOptions::new();
    if write {
        opts.create(true).append(true);
    } else {
        opts.read(true);
    }
    opts.open(path).map_err(|source| DaemonizeError::Open {
        path: path.display().to_string(),
        source,
    })
}

fn fork_and_exit_parent(stage: u8) -> Result<(), DaemonizeError> {
    // SAFETY: the process is single-threaded when this runs.
    match unsafe { libc::fork() } {
        -1 => Err(DaemonizeError::Fork {
            stage,
            source: io::Error::last_os_error(),
        }),
        0 => Ok(()),
        _ => std::process::exit(0),
    }
}

fn redirect(file: &File, target: libc::c_int) -> io::Result<()> {
    // SAFETY: both descriptors are valid for the duration of the call.
    if unsafe { libc::dup2(file.as_raw_fd(), target) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
