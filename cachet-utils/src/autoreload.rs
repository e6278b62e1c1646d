//! Development reloader: restart the process when watched files change.
//!
//! The process runs twice. The supervising parent spawns a copy of itself
//! with [`RUN_MAIN_ENV`] set to `true` and waits. The child runs the program
//! on a thread and polls the watched files; on a change it exits with
//! [`RELOAD_EXIT_CODE`], which makes the parent spawn a fresh child. Any other
//! exit code ends the supervision.
//!
//! ```no_run
//! use cachet_utils::autoreload::{Reloader, run_with_reloader};
//!
//! let reloader = Reloader::new(["config.yaml", "templates/index.html"]);
//! let code = run_with_reloader(reloader, || {
//!     // serve requests
//! })
//! .unwrap();
//! std::process::exit(code);
//! ```

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable marking the reloaded child process.
pub const RUN_MAIN_ENV: &str = "RUN_MAIN";

/// Exit code a child uses to ask for a restart.
pub const RELOAD_EXIT_CODE: i32 = 3;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Errors raised while supervising child processes.
#[derive(Error, Debug)]
pub enum ReloadError {
    /// The path of the running executable is unknown.
    #[error("cannot locate the current executable: {0}")]
    CurrentExe(#[source] io::Error),

    /// A child process could not be started or waited on.
    #[error("cannot run child process: {0}")]
    Spawn(#[source] io::Error),
}

/// Remembers modification times of watched files.
#[derive(Debug, Default)]
pub struct ModificationTracker {
    mtimes: HashMap<PathBuf, SystemTime>,
}

impl ModificationTracker {
    /// Creates a tracker with no recorded files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any of `files` changed since it was first seen.
    ///
    /// Unseen files are recorded and count as unchanged. Files that cannot be
    /// inspected are skipped. A detected change forgets every recorded time,
    /// so the next call starts over.
    pub fn code_changed<I, P>(&mut self, files: I) -> bool
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for file in files {
            let file = file.as_ref();
            let Ok(mtime) = std::fs::metadata(file).and_then(|meta| meta.modified()) else {
                continue;
            };
            match self.mtimes.get(file) {
                None => {
                    self.mtimes.insert(file.to_path_buf(), mtime);
                }
                Some(seen) if *seen != mtime => {
                    debug!(file = %file.display(), "watched file changed");
                    self.reset();
                    return true;
                }
                Some(_) => {}
            }
        }
        false
    }

    /// Forgets every recorded time.
    pub fn reset(&mut self) {
        self.mtimes.clear();
    }

    /// Number of files being tracked.
    pub fn len(&self) -> usize {
        self.mtimes.len()
    }

    /// Returns `true` when no file is tracked.
    pub fn is_empty(&self) -> bool {
        self.mtimes.is_empty()
    }
}

/// Why [`Reloader::watch`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// A watched file changed.
    Changed,
    /// The stop flag was raised.
    Stopped,
}

/// Polls a fixed set of files for changes.
#[derive(Debug)]
pub struct Reloader {
    files: Vec<PathBuf>,
    interval: Duration,
    tracker: ModificationTracker,
}

impl Reloader {
    /// Watches `files`, polling once per second.
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            interval: DEFAULT_INTERVAL,
            tracker: ModificationTracker::new(),
        }
    }

    /// Overrides the polling interval.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Watched files.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Blocks until a watched file changes or `stop` is set.
    ///
    /// The first poll happens immediately and only records the current
    /// modification times.
    pub fn watch(&mut self, stop: &AtomicBool) -> WatchOutcome {
        loop {
            if stop.load(Ordering::Acquire) {
                return WatchOutcome::Stopped;
            }
            if self.tracker.code_changed(&self.files) {
                return WatchOutcome::Changed;
            }
            thread::sleep(self.interval);
        }
    }
}

/// Exit code of a finished child. Signals map to `128 + signal` on Unix.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Runs commands from `command` one after another until one exits with a
/// code other than [`RELOAD_EXIT_CODE`], and returns that code.
pub fn supervise<F>(mut command: F) -> Result<i32, ReloadError>
where
    F: FnMut() -> Command,
{
    loop {
        let status = command()
            .status()
            .map_err(ReloadError::Spawn)?;
        let code = exit_code(status);
        if code != RELOAD_EXIT_CODE {
            if code != 0 {
                warn!(code, "child process failed");
            }
            return Ok(code);
        }
        debug!("restarting child process");
    }
}

/// Respawns the current executable with the same arguments and
/// `RUN_MAIN=true` until it exits with something other than
/// [`RELOAD_EXIT_CODE`].
pub fn restart_with_reloader() -> Result<i32, ReloadError> {
    let executable = std::env::current_exe().map_err(ReloadError::CurrentExe)?;
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    supervise(|| {
        let mut command = Command::new(&executable);
        command.args(&args).env(RUN_MAIN_ENV, "true");
        command
    })
}

/// Whether this process is the reloaded child.
pub fn is_reloaded_child() -> bool {
    std::env::var_os(RUN_MAIN_ENV).is_some_and(|value| value == "true")
}

/// Sets the flag when dropped, including on unwind.
struct StopOnDrop(Arc<AtomicBool>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Runs `main` under the reloader and returns the code to exit with.
///
/// In the child, `main` runs on its own thread while `reloader` polls. A
/// change yields [`RELOAD_EXIT_CODE`]; `main` returning yields `0` (or `1`
/// if it panicked). In the parent, this supervises children through
/// [`restart_with_reloader`].
pub fn run_with_reloader<F>(mut reloader: Reloader, main: F) -> Result<i32, ReloadError>
where
    F: FnOnce() + Send + 'static,
{
    if !is_reloaded_child() {
        return restart_with_reloader();
    }

    let stop = Arc::new(AtomicBool::new(false));
    let guard = StopOnDrop(Arc::clone(&stop));
    let handle = thread::spawn(move || {
        let _guard = guard;
        main();
    });

    match reloader.watch(&stop) {
        WatchOutcome::Changed => Ok(RELOAD_EXIT_CODE),
        WatchOutcome::Stopped => match handle.join() {
            Ok(()) => Ok(0),
            Err(_) => {
                warn!("main thread panicked");
                Ok(1)
            }
        },
    }
}
