//! Remote transport over the OpenSSH client.
//!
//! Every [`Transport::run`] is one `ssh host <command>` invocation, which is
//! exactly the "fresh shell per command" model the session layer expects.
//! On Unix the invocations share one multiplexed master connection
//! (`ControlMaster`), so only `open` pays for the handshake.

use std::path::PathBuf;
#[cfg(unix)]
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{DirectoryStrategy, Transport};
use crate::error::TermhopError;
use crate::execution::{
    run_to_completion, run_with_timeout, CommandOutput, CommandRequest, DEFAULT_TIMEOUT,
};
use crate::Result;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default connection establishment timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Exit status the OpenSSH client uses for its own failures.
const SSH_ERROR_STATUS: i32 = 255;

#[cfg(unix)]
static CONTROL_COUNTER: AtomicU64 = AtomicU64::new(1);

/// How to authenticate against the remote host.
#[derive(Clone, PartialEq, Eq)]
pub enum SshAuth {
    /// Keys from `~/.ssh` or a running agent.
    Agent,
    /// An explicit private key file.
    KeyFile(PathBuf),
    /// Password authentication, fed through `sshpass -e`.
    Password(String),
}

impl std::fmt::Debug for SshAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent => f.write_str("Agent"),
            Self::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
            Self::Password(_) => f.write_str("Password(***)"),
        }
    }
}

/// Where and as whom to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshCredentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: SshAuth,
}

impl SshCredentials {
    /// Credentials using agent/default keys on the default port.
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            username: username.into(),
            auth: SshAuth::Agent,
        }
    }

    /// Parse `user@host`. Returns `None` when either part is missing.
    pub fn parse_target(target: &str) -> Option<Self> {
        let (user, host) = target.split_once('@')?;
        if user.is_empty() || host.is_empty() {
            return None;
        }
        Some(Self::new(host, user))
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth = SshAuth::KeyFile(path.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = SshAuth::Password(password.into());
        self
    }
}

/// Transport running commands on a remote host through `ssh`.
#[derive(Debug)]
pub struct SshTransport {
    credentials: SshCredentials,
    program: String,
    connect_timeout: Duration,
    command_timeout: Duration,
    control_path: Option<PathBuf>,
    open: bool,
}

impl SshTransport {
    /// Create a transport for the given credentials.
    pub fn new(credentials: SshCredentials) -> Self {
        Self {
            credentials,
            program: "ssh".to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_timeout: DEFAULT_TIMEOUT,
            control_path: default_control_path(),
            open: false,
        }
    }

    /// Bound on connection establishment.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Timeout used when a request does not carry its own.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Use a different `ssh` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Disable connection multiplexing.
    pub fn without_multiplexing(mut self) -> Self {
        self.control_path = None;
        self
    }

    pub fn credentials(&self) -> &SshCredentials {
        &self.credentials
    }

    /// Arguments passed to `ssh` before the remote command.
    pub(crate) fn ssh_args(&self) -> Vec<String> {
        let creds = &self.credentials;
        let mut args = vec![
            "-T".to_string(),
            "-p".to_string(),
            creds.port.to_string(),
            "-l".to_string(),
            creds.username.clone(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
        ];

        match &creds.auth {
            SshAuth::Agent => {
                args.extend(["-o".to_string(), "BatchMode=yes".to_string()]);
            }
            SshAuth::KeyFile(path) => {
                args.extend([
                    "-o".to_string(),
                    "BatchMode=yes".to_string(),
                    "-i".to_string(),
                    path.to_string_lossy().into_owned(),
                ]);
            }
            SshAuth::Password(_) => {
                args.extend([
                    "-o".to_string(),
                    "PubkeyAuthentication=no".to_string(),
                    "-o".to_string(),
                    "NumberOfPasswordPrompts=1".to_string(),
                ]);
            }
        }

        if let Some(path) = &self.control_path {
            args.extend([
                "-o".to_string(),
                "ControlMaster=auto".to_string(),
                "-o".to_string(),
                format!("ControlPath={}", path.display()),
                "-o".to_string(),
                "ControlPersist=yes".to_string(),
            ]);
        }

        args.push("--".to_string());
        args.push(creds.host.clone());
        args
    }

    fn command(&self, remote_command: &str) -> Command {
        let mut command = match &self.credentials.auth {
            SshAuth::Password(password) => {
                let mut c = Command::new("sshpass");
                c.arg("-e").arg(&self.program).env("SSHPASS", password);
                c
            }
            _ => Command::new(&self.program),
        };
        command.args(self.ssh_args()).arg(remote_command);
        command
    }

    fn target(&self) -> String {
        format!(
            "{}@{}:{}",
            self.credentials.username, self.credentials.host, self.credentials.port
        )
    }
}

#[async_trait]
impl Transport for SshTransport {
    fn name(&self) -> &'static str {
        "ssh"
    }

    fn strategy(&self) -> DirectoryStrategy {
        DirectoryStrategy::RoundTrip
    }

    async fn open(&mut self) -> Result<String> {
        let target = self.target();
        debug!(%target, "opening ssh connection");

        // Bounded by ConnectTimeout and by the caller's connect deadline.
        let output = run_to_completion(self.command("true")).await?;
        if !output.success() {
            let message = output.stderr.trim();
            let message = if message.is_empty() {
                format!("ssh exited with status {:?}", output.exit_code)
            } else {
                message.to_string()
            };
            warn!(%target, %message, "ssh connection failed");
            return Err(TermhopError::Transport(message));
        }

        self.open = true;
        info!(%target, "ssh connection established");
        Ok("Connected successfully".to_string())
    }

    async fn run(&mut self, request: &CommandRequest) -> Result<CommandOutput> {
        if !self.open {
            return Err(TermhopError::NotConnected);
        }
        debug!(command = %request.command_line, "ssh run");
        let output = run_with_timeout(
            self.command(&request.command_line),
            request.timeout_or(self.command_timeout),
        )
        .await?;

        if output.exit_code == Some(SSH_ERROR_STATUS) && output.stdout.is_empty() {
            return Err(TermhopError::Transport(output.stderr.trim().to_string()));
        }
        Ok(output)
    }

    async fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;

        if let Some(path) = &self.control_path {
            let mut command = Command::new(&self.program);
            command
                .arg("-O")
                .arg("exit")
                .arg("-o")
                .arg(format!("ControlPath={}", path.display()))
                .arg("--")
                .arg(&self.credentials.host);
            if let Err(e) = run_with_timeout(command, self.connect_timeout).await {
                debug!(error = %e, "ssh master shutdown failed");
            }
        }
        info!(target = %self.target(), "ssh connection closed");
    }
}

#[cfg(unix)]
fn default_control_path() -> Option<PathBuf> {
    let n = CONTROL_COUNTER.fetch_add(1, Ordering::Relaxed);
    Some(std::env::temp_dir().join(format!("termhop-{}-{n}.sock", std::process::id())))
}

#[cfg(not(unix))]
fn default_control_path() -> Option<PathBuf> {
    None
}
