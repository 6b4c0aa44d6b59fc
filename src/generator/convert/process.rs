//! Running the external converter.
//!
//! The converter is started without a shell, with stdin and stdout closed,
//! and its stderr collected on a separate thread so a chatty child can't block
//! on a full pipe. On Unix it leads its own process group, so whatever it
//! starts in turn can be killed along with it. The parent polls for exit until
//! the deadline; the same deadline bounds the wait for stderr to close.

use crate::config::ConvertConfig;
use crate::error::ConversionFailure;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time allowed for stderr to drain once the process group is gone.
const STDERR_GRACE: Duration = Duration::from_millis(250);

/// Longest stretch of converter stderr kept for error messages.
const MAX_STDERR: usize = 4096;

/// What happened when the converter ran.
#[derive(Debug)]
pub enum ConversionOutcome {
    /// Exit status 0 and a non-empty file at the output path
    Converted(PathBuf),
    /// Exit status 0 but nothing usable at the output path
    MissingOutput(PathBuf),
    /// Non-zero exit, or killed by a signal
    Failed { status: ExitStatus, stderr: String },
    TimedOut(Duration),
}

impl ConversionOutcome {
    /// Anything other than `Converted` is a failure.
    pub fn into_result(self) -> Result<PathBuf, ConversionFailure> {
        match self {
            ConversionOutcome::Converted(path) => Ok(path),
            ConversionOutcome::MissingOutput(path) => Err(ConversionFailure::MissingOutput { path }),
            ConversionOutcome::Failed { status, stderr } => {
                Err(ConversionFailure::Exit { status, stderr })
            }
            ConversionOutcome::TimedOut(after) => Err(ConversionFailure::TimedOut { after }),
        }
    }
}

/// An `ebook-convert` compatible command line tool.
#[derive(Debug, Clone)]
pub struct Converter {
    command: String,
    timeout: Duration,
}

impl Converter {
    pub fn new(config: &ConvertConfig) -> Converter {
        Converter {
            command: config.command.clone(),
            timeout: config.timeout(),
        }
    }

    /// Convert `input` into `output`, the target format being implied by the
    /// output file's extension.
    ///
    /// Failing to start the process or to wait for it is an `Err`; everything
    /// else is reported through the outcome. No process started by the
    /// converter outlives this call on Unix.
    pub fn run(
        &self,
        input: &Path,
        output: &Path,
        parameters: &[&str],
    ) -> Result<ConversionOutcome, ConversionFailure> {
        log::debug!(
            "running {} {} {} {}",
            self.command,
            input.display(),
            output.display(),
            parameters.join(" ")
        );

        let mut command = Command::new(&self.command);
        command
            .arg(input)
            .arg(output)
            .args(parameters)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|source| ConversionFailure::Spawn {
            command: self.command.clone(),
            source,
        })?;
        let deadline = Instant::now() + self.timeout;

        let (sender, stderr) = mpsc::channel();
        match child.stderr.take() {
            Some(mut pipe) => {
                std::thread::spawn(move || {
                    let mut buffer = Vec::new();
                    let _ = pipe.read_to_end(&mut buffer);
                    let _ = sender.send(buffer);
                });
            }
            None => drop(sender),
        }

        let status = match wait_until(|| child.try_wait(), deadline) {
            Ok(Some(status)) => status,
            Ok(None) => {
                log::warn!(
                    "{} did not finish within {:?}, killing it",
                    self.command,
                    self.timeout
                );
                terminate(&mut child);
                return Ok(ConversionOutcome::TimedOut(self.timeout));
            }
            Err(source) => {
                terminate(&mut child);
                return Err(ConversionFailure::Wait {
                    command: self.command.clone(),
                    source,
                });
            }
        };

        // helpers left running in the background go with the converter
        kill_group(&child);

        let remaining = deadline.saturating_duration_since(Instant::now());
        let stderr = match stderr.recv_timeout(remaining.max(STDERR_GRACE)) {
            Ok(bytes) => truncate(String::from_utf8_lossy(&bytes).trim()),
            Err(RecvTimeoutError::Disconnected) => String::new(),
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "stderr of {} stayed open past {:?}",
                    self.command,
                    self.timeout
                );
                return Ok(ConversionOutcome::TimedOut(self.timeout));
            }
        };

        if !status.success() {
            return Ok(ConversionOutcome::Failed { status, stderr });
        }

        let produced = std::fs::metadata(output)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);
        if produced {
            Ok(ConversionOutcome::Converted(output.to_path_buf()))
        } else {
            Ok(ConversionOutcome::MissingOutput(output.to_path_buf()))
        }
    }
}

/// Poll until the process exits or `deadline` passes; `Ok(None)` means it is
/// still running.
fn wait_until<F>(mut poll: F, deadline: Instant) -> std::io::Result<Option<ExitStatus>>
where
    F: FnMut() -> std::io::Result<Option<ExitStatus>>,
{
    loop {
        if let Some(status) = poll()? {
            return Ok(Some(status));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// Kill the converter along with its process group, then reap it.
fn terminate(child: &mut Child) {
    kill_group(child);
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn kill_group(child: &Child) {
    let Ok(group) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) takes no pointers; a negative pid signals the group
    // the converter leads since `process_group(0)`.
    unsafe {
        libc::kill(-group, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

fn truncate(text: &str) -> String {
    if text.len() <= MAX_STDERR {
        return text.to_string();
    }
    let mut end = MAX_STDERR;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
