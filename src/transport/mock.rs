//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{DirectoryStrategy, Transport};
use crate::error::TermhopError;
use crate::execution::{CommandOutput, CommandRequest};
use crate::Result;

/// Replays queued responses in order and records every request.
///
/// With an empty queue `run` answers with empty output.
#[derive(Clone)]
pub(crate) struct MockTransport {
    strategy: DirectoryStrategy,
    fail_open: Option<String>,
    stall_open: Arc<Mutex<bool>>,
    responses: Arc<Mutex<VecDeque<Result<CommandOutput>>>>,
    requests: Arc<Mutex<Vec<CommandRequest>>>,
    closed: Arc<Mutex<usize>>,
}

impl MockTransport {
    pub(crate) fn new(strategy: DirectoryStrategy) -> Self {
        Self {
            strategy,
            fail_open: None,
            stall_open: Arc::default(),
            responses: Arc::default(),
            requests: Arc::default(),
            closed: Arc::default(),
        }
    }

    pub(crate) fn remote() -> Self {
        Self::new(DirectoryStrategy::RoundTrip)
    }

    pub(crate) fn failing_open(mut self, message: &str) -> Self {
        self.fail_open = Some(message.to_string());
        self
    }

    /// Make the next `open` never complete.
    pub(crate) fn stall_next_open(&self) -> &Self {
        *self.stall_open.lock().unwrap() = true;
        self
    }

    pub(crate) fn respond(&self, stdout: &str, stderr: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(CommandOutput::new(stdout, stderr).with_exit_code(0)));
        self
    }

    pub(crate) fn fail(&self, err: TermhopError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.command_line.clone())
            .collect()
    }

    pub(crate) fn requests(&self) -> Vec<CommandRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn close_count(&self) -> usize {
        *self.closed.lock().unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn strategy(&self) -> DirectoryStrategy {
        self.strategy
    }

    async fn open(&mut self) -> Result<String> {
        let stall = std::mem::take(&mut *self.stall_open.lock().unwrap());
        if stall {
            std::future::pending::<()>().await;
        }
        match &self.fail_open {
            Some(message) => Err(TermhopError::Transport(message.clone())),
            None => Ok("Connected successfully".to_string()),
        }
    }

    async fn run(&mut self, request: &CommandRequest) -> Result<CommandOutput> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CommandOutput::default().with_exit_code(0)))
    }

    async fn close(&mut self) {
        *self.closed.lock().unwrap() += 1;
    }

    fn home_directory(&self) -> Option<String> {
        match self.strategy {
            DirectoryStrategy::Native => Some("/home/mock".to_string()),
            DirectoryStrategy::RoundTrip => None,
        }
    }
}
