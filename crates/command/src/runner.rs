/*
 * vSMTP mail transfer agent
 *
 * Copyright (C) 2003 - viridIT SAS
 * Licensed under the Elastic License 2.0
 *
 * You should have received a copy of the Elastic License 2.0 along with
 * this program. If not, see https://www.elastic.co/licensing/elastic-license.
 *
 */

use vcheck_mail_parser::{read_header_block, Headers, ParserError};

/// Program and arguments of a single invocation, placeholders resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Termination of the program and the header block it produced.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: std::process::ExitStatus,
    pub headers: Headers,
}

/// Failures of the invocation itself, as opposed to decisions of the program.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open the pipes of the program")]
    Pipe,
    #[error("failed to send the input to the program: {0}")]
    Input(#[source] std::io::Error),
    #[error("malformed header block: {0}")]
    Header(#[from] ParserError),
    #[error("the output of the program could not be read")]
    ReaderGone,
    #[error("the program did not complete within {}", humantime::format_duration(*.0))]
    Timeout(std::time::Duration),
    #[error("failed to wait for the program: {0}")]
    Wait(#[source] std::io::Error),
}

impl RunError {
    /// Short tag of the failure, for the logs.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "spawn",
            Self::Pipe => "pipe",
            Self::Input(_) => "input",
            Self::Header(_) => "header",
            Self::ReaderGone => "output",
            Self::Timeout(_) => "timeout",
            Self::Wait(_) => "wait",
        }
    }
}

/// Point in time the program must be done by, `None` when unbounded.
#[derive(Debug, Clone, Copy)]
struct Deadline(Option<std::time::Instant>);

impl Deadline {
    /// A zero `timeout`, or one too far in the future to be represented,
    /// leaves the program unbounded.
    fn new(timeout: std::time::Duration) -> Self {
        if timeout.is_zero() {
            return Self(None);
        }
        Self(std::time::Instant::now().checked_add(timeout))
    }

    fn remaining(self) -> Option<std::time::Duration> {
        self.0
            .map(|deadline| deadline.saturating_duration_since(std::time::Instant::now()))
    }

    fn recv<T>(
        self,
        receiver: &std::sync::mpsc::Receiver<T>,
    ) -> Result<T, std::sync::mpsc::RecvTimeoutError> {
        match self.remaining() {
            Some(remaining) => receiver.recv_timeout(remaining),
            None => receiver
                .recv()
                .map_err(|_| std::sync::mpsc::RecvTimeoutError::Disconnected),
        }
    }

    fn wait(
        self,
        child: &mut std::process::Child,
    ) -> std::io::Result<Option<std::process::ExitStatus>> {
        match self.remaining() {
            Some(remaining) => wait_timeout::ChildExt::wait_timeout(child, remaining),
            None => child.wait().map(Some),
        }
    }
}

/// Run the program with `input` on its standard input, read the header block
/// at the start of its standard output and wait for it to terminate.
///
/// The header read, the wait and the end of the input share the `timeout`
/// deadline, a zero `timeout` meaning no limit. On expiry the process group of
/// the program is killed. On any other failure a running program is sent
/// `SIGINT` and reaped in the background.
///
/// # Errors
///
/// * the program cannot be started
/// * the input cannot be read or sent to the program
/// * the header block is malformed
/// * the program did not terminate in time
/// * the program cannot be waited for
#[tracing::instrument(skip(command_line, input), fields(command = %command_line), err)]
pub fn run(
    command_line: &CommandLine,
    mut input: Box<dyn std::io::Read + Send>,
    timeout: std::time::Duration,
) -> Result<ProcessOutput, RunError> {
    use std::os::unix::process::CommandExt;

    let deadline = Deadline::new(timeout);

    let mut child = std::process::Command::new(command_line.program())
        .args(command_line.args())
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .process_group(0)
        .spawn()
        .map_err(|source| RunError::Spawn {
            program: command_line.program().to_string(),
            source,
        })?;

    let (Some(mut stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
        interrupt(child);
        return Err(RunError::Pipe);
    };

    let (input_sender, input_receiver) = std::sync::mpsc::sync_channel(1);
    std::thread::spawn(move || {
        let result = match std::io::copy(&mut input, &mut stdin) {
            // The program does not have to read all of its input.
            Err(error) if error.kind() == std::io::ErrorKind::BrokenPipe => Ok(None),
            otherwise => otherwise.map(Some),
        };
        // Closes the standard input of the program.
        drop(stdin);
        let _ = input_sender.send(result);
    });

    let (sender, receiver) = std::sync::mpsc::sync_channel(1);
    std::thread::spawn(move || {
        let mut stdout = std::io::BufReader::new(stdout);
        if sender.send(read_header_block(&mut stdout)).is_err() {
            return;
        }
        // Keep the pipe open until the program closes it.
        if let Err(error) = std::io::copy(&mut stdout, &mut std::io::sink()) {
            tracing::trace!(%error, "Failed to drain the output of the program.");
        }
    });

    let headers = match deadline.recv(&receiver) {
        Ok(Ok(headers)) => headers,
        Ok(Err(error)) => {
            interrupt(child);
            return Err(error.into());
        }
        Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
            kill(child);
            return Err(RunError::Timeout(timeout));
        }
        Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
            interrupt(child);
            return Err(RunError::ReaderGone);
        }
    };
    tracing::trace!(count = headers.len(), "Header block read.");

    let status = match deadline.wait(&mut child) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill(child);
            return Err(RunError::Timeout(timeout));
        }
        Err(error) => {
            interrupt(child);
            return Err(RunError::Wait(error));
        }
    };
    tracing::debug!(%status, "Program terminated.");

    // A program that saw a truncated input cannot be trusted.
    match deadline.recv(&input_receiver) {
        Ok(Ok(written)) => {
            tracing::trace!(?written, "Input sent to the program.");
            Ok(ProcessOutput { status, headers })
        }
        Ok(Err(error)) => Err(RunError::Input(error)),
        Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
            kill_group(&child);
            Err(RunError::Timeout(timeout))
        }
        Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => Err(RunError::Input(
            std::io::Error::new(std::io::ErrorKind::Other, "the input thread panicked"),
        )),
    }
}

/// Send `signal` to the process group led by `child`.
fn signal(child: &std::process::Child, signal: libc::c_int) -> std::io::Result<()> {
    let pid = libc::pid_t::try_from(child.id())
        .map_err(|error| std::io::Error::new(std::io::ErrorKind::InvalidInput, error))?;

    #[allow(unsafe_code)]
    // SAFETY: ffi call
    let result = unsafe { libc::kill(-pid, signal) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Send `SIGINT` to the program if it is still running, without waiting for it.
fn interrupt(mut child: std::process::Child) {
    if !matches!(child.try_wait(), Ok(None)) {
        return;
    }

    if let Err(error) = signal(&child, libc::SIGINT) {
        tracing::debug!(%error, "Failed to interrupt the program.");
    }

    std::thread::spawn(move || {
        if let Err(error) = child.wait() {
            tracing::debug!(%error, "Failed to reap the program.");
        }
    });
}

/// Kill the processes the program left behind, the program itself included
/// when it has not been reaped.
fn kill_group(child: &std::process::Child) {
    match signal(child, libc::SIGKILL) {
        // Nothing left in the group.
        Err(error) if error.raw_os_error() == Some(libc::ESRCH) => {}
        Err(error) => tracing::debug!(%error, "Failed to kill the program."),
        Ok(()) => {}
    }
}

fn kill(mut child: std::process::Child) {
    kill_group(&child);
    if let Err(error) = child.wait() {
        tracing::debug!(%error, "Failed to reap the program.");
    }
}
