//! The session: lifecycle plus directory-tracking dispatch.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::chain::CommandChain;
use super::compose::{compose, prefix_directory, Dispatch};
use super::context::{SessionContext, StateProbe};
use super::resolve::{ChainPlan, DirectoryResolver};
use super::state::SessionState;
use crate::error::TermhopError;
use crate::execution::{CommandRequest, ExecutionResult, DEFAULT_TIMEOUT};
use crate::output::OutputSanitizer;
use crate::transport::{DirectoryStrategy, LocalTransport, SshCredentials, SshTransport, Transport};
use crate::Result;

/// Timeouts and startup options for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bound on `connect`.
    pub connect_timeout: Duration,
    /// Bound on each command and directory probe.
    pub command_timeout: Duration,
    /// Bound on completion lookups.
    pub completion_timeout: Duration,
    /// Shell program for local sessions (platform default when unset).
    pub shell: Option<String>,
    /// Initial directory for local sessions (process directory when unset).
    pub start_directory: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            command_timeout: DEFAULT_TIMEOUT,
            completion_timeout: Duration::from_secs(2),
            shell: None,
            start_directory: None,
        }
    }
}

/// A command session over one transport.
///
/// Methods take `&mut self`, so one session never runs two operations at
/// once. Each call awaits its transport round-trip to completion.
pub struct Session {
    transport: Box<dyn Transport>,
    state: SessionState,
    context: SessionContext,
    config: SessionConfig,
}

impl Session {
    /// Create a session over an arbitrary transport.
    pub fn new(transport: impl Transport + 'static, config: SessionConfig) -> Self {
        Self::with_boxed(Box::new(transport), config)
    }

    /// Create a session over an already boxed transport.
    pub fn with_boxed(transport: Box<dyn Transport>, config: SessionConfig) -> Self {
        Self {
            transport,
            state: SessionState::Disconnected,
            context: SessionContext::new(),
            config,
        }
    }

    /// Session over the local shell.
    pub fn local(config: SessionConfig) -> Self {
        let mut transport = LocalTransport::new().with_timeout(config.command_timeout);
        if let Some(shell) = &config.shell {
            transport = transport.with_shell(shell);
        }
        Self::new(transport, config)
    }

    /// Session over SSH.
    pub fn ssh(credentials: SshCredentials, config: SessionConfig) -> Self {
        let transport = SshTransport::new(credentials)
            .with_connect_timeout(config.connect_timeout)
            .with_command_timeout(config.command_timeout);
        Self::new(transport, config)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.can_execute()
    }

    /// Best-known working directory.
    pub fn tracked_directory(&self) -> Option<&str> {
        self.context.tracked_directory()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Open the transport and capture the initial directory.
    ///
    /// The directory probe is best effort; if it fails the tracked
    /// directory stays unset. Calling this while connected is a no-op.
    pub async fn connect(&mut self) -> Result<String> {
        if self.state.can_execute() {
            return Ok("Already connected".to_string());
        }
        if self.state == SessionState::Connecting {
            // An earlier connect was dropped before it finished.
            debug!("abandoned connect attempt, closing transport");
            self.transport.close().await;
            self.state.transition_to(SessionState::Disconnected)?;
        }
        self.state.transition_to(SessionState::Connecting)?;
        info!(transport = self.transport.name(), "connecting");

        let opened = match tokio::time::timeout(self.config.connect_timeout, self.transport.open()).await {
            Ok(result) => result,
            Err(_) => Err(TermhopError::Transport(format!(
                "Connection timed out ({} seconds)",
                self.config.connect_timeout.as_secs()
            ))),
        };
        let message = match opened {
            Ok(message) => message,
            Err(err) => {
                warn!(transport = self.transport.name(), error = %err, "connect failed");
                self.transport.close().await;
                self.state.transition_to(SessionState::Disconnected)?;
                return Err(match err {
                    TermhopError::Transport(_) => err,
                    other => TermhopError::Transport(other.to_string()),
                });
            }
        };

        let initial = self.probe_initial_directory().await;
        debug!(directory = ?initial, "initial directory");
        self.context.clear();
        self.context.set_tracked_directory(initial);
        self.state.transition_to(SessionState::Connected)?;
        info!(transport = self.transport.name(), "connected");
        Ok(message)
    }

    async fn probe_initial_directory(&mut self) -> Option<String> {
        match self.transport.strategy() {
            DirectoryStrategy::RoundTrip => {
                let request = CommandRequest::new(StateProbe::cwd_command())
                    .timeout(self.config.command_timeout);
                match self.transport.run(&request).await {
                    Ok(output) => StateProbe::parse_cwd(&output.stdout),
                    Err(e) => {
                        warn!(error = %e, "initial directory probe failed");
                        None
                    }
                }
            }
            DirectoryStrategy::Native => {
                if let Some(dir) = &self.config.start_directory {
                    if Path::new(dir).is_dir() {
                        return Some(dir.clone());
                    }
                    warn!(directory = %dir, "start directory missing, using process directory");
                }
                std::env::current_dir()
                    .ok()
                    .map(|p| p.to_string_lossy().into_owned())
            }
        }
    }

    /// Run one command line, tracking any `cd`s it contains.
    ///
    /// A lone `cd` is resolved without running anything and answers with
    /// the new directory. Soft `cd` failures come back as `Ok` results with
    /// `success = true` and the error text as output.
    pub async fn execute_command(&mut self, line: &str) -> Result<ExecutionResult> {
        if !self.state.can_execute() {
            return Err(TermhopError::NotConnected);
        }

        let chain = CommandChain::parse(line);
        let strategy = self.transport.strategy();
        let plan = if chain.has_cd() {
            let mut resolver =
                DirectoryResolver::new(self.transport.as_mut(), self.config.command_timeout);
            resolver
                .resolve_chain(
                    &chain,
                    self.context.tracked_directory(),
                    self.context.previous_directory(),
                )
                .await
        } else {
            let current = self.context.tracked_directory().map(str::to_string);
            ChainPlan {
                directory: current.clone(),
                previous: self.context.previous_directory().map(str::to_string),
                dispatch_directory: current,
                ..Default::default()
            }
        };

        if plan.directory.as_deref() != self.context.tracked_directory() {
            debug!(from = ?self.context.tracked_directory(), to = ?plan.directory, "tracked directory changed");
        }
        self.context
            .set_directories(plan.directory.clone(), plan.previous.clone());

        match compose(&chain, plan, strategy) {
            Dispatch::Done(result) => Ok(result),
            Dispatch::Run(request) => {
                let request = request.timeout(self.config.command_timeout);
                debug!(command = %request.command_line, "dispatching");
                let output = self.transport.run(&request).await?;
                let text = match strategy {
                    DirectoryStrategy::RoundTrip => output.preferred().to_string(),
                    DirectoryStrategy::Native => output.combined(),
                };
                Ok(ExecutionResult::ok(text))
            }
        }
    }

    /// Shell completions for `partial`, or an empty list on any failure.
    pub async fn get_completions(&mut self, partial: &str) -> Vec<String> {
        if !self.state.can_execute() {
            return Vec::new();
        }
        let Some(lookup) = StateProbe::completion_command(partial) else {
            return Vec::new();
        };

        let directory = self.context.tracked_directory();
        let request = match self.transport.strategy() {
            DirectoryStrategy::RoundTrip => CommandRequest::new(prefix_directory(directory, &lookup)),
            DirectoryStrategy::Native => CommandRequest::new(lookup).working_dir_opt(directory),
        }
        .timeout(self.config.completion_timeout);

        match self.transport.run(&request).await {
            Ok(output) => {
                let mut seen = std::collections::HashSet::new();
                OutputSanitizer::lines(&output.stdout)
                    .into_iter()
                    .filter(|candidate| seen.insert(candidate.clone()))
                    .collect()
            }
            Err(e) => {
                debug!(error = %e, "completion lookup failed");
                Vec::new()
            }
        }
    }

    /// Close the transport and forget directory state. Idempotent.
    pub async fn disconnect(&mut self) {
        if self.state != SessionState::Disconnected {
            self.transport.close().await;
            info!(transport = self.transport.name(), "disconnected");
        }
        self.state.reset();
        self.context.clear();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("transport", &self.transport.name())
            .field("state", &self.state)
            .field("context", &self.context)
            .finish()
    }
}
