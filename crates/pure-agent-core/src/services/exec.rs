use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub cwd: Option<PathBuf>,
    /// Added on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("'{0}' not found on PATH")]
    NotFound(String),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("'{program}' timed out after {secs}s")]
    TimedOut { program: String, secs: u64 },
}

/// Runs external programs. Injected so handlers and tools can be tested
/// without spawning processes.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], opts: &ExecOptions)
        -> Result<ExecOutput, ExecError>;
}

/// Runs programs on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        opts: &ExecOptions,
    ) -> Result<ExecOutput, ExecError> {
        let exe = which::which(program).map_err(|_| ExecError::NotFound(program.to_string()))?;

        let mut cmd = Command::new(exe);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &opts.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &opts.env {
            cmd.env(k, v);
        }

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;
        let child_pid = child.id();

        // Drain both pipes on their own threads so a chatty child cannot block
        // on a full pipe buffer.
        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let stdout_thread = std::thread::spawn(move || read_all(stdout_handle));
        let stderr_thread = std::thread::spawn(move || read_all(stderr_handle));

        let wait_result = match opts.timeout {
            None => child.wait(),
            Some(timeout) => {
                let (tx, rx) = std::sync::mpsc::channel();
                std::thread::spawn(move || {
                    let _ = tx.send(child.wait());
                });
                match rx.recv_timeout(timeout) {
                    Ok(result) => result,
                    Err(_) => {
                        kill_process(child_pid);
                        return Err(ExecError::TimedOut {
                            program: program.to_string(),
                            secs: timeout.as_secs(),
                        });
                    }
                }
            }
        };

        let stdout = stdout_thread.join().unwrap_or_default();
        let stderr = stderr_thread.join().unwrap_or_default();

        let status = wait_result.map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;
        if !status.success() {
            return Err(ExecError::Failed {
                program: program.to_string(),
                status: describe_status(status),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(ExecOutput { stdout, stderr })
    }
}

fn read_all<R: Read>(handle: Option<R>) -> String {
    let mut buf = String::new();
    if let Some(mut r) = handle {
        let _ = r.read_to_string(&mut buf);
    }
    buf
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

/// Best-effort SIGKILL by PID.
fn kill_process(pid: u32) {
    let _ = Command::new("kill")
        .arg("-9")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}
