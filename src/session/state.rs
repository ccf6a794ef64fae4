//! Session lifecycle state machine.

/// Lifecycle state of a session's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No transport connection. Initial and final state.
    #[default]
    Disconnected,
    /// `connect` is in progress.
    Connecting,
    /// Commands may be executed.
    Connected,
}

impl SessionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Disconnected -> Connecting
    /// - Connecting -> Connected
    /// - Connecting -> Disconnected (connect failed)
    /// - Connected -> Disconnected
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (*self, target),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
        )
    }

    /// Attempt to transition to a new state.
    pub fn transition_to(&mut self, target: SessionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::TermhopError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Force the session back to `Disconnected` from any state.
    pub fn reset(&mut self) {
        *self = SessionState::Disconnected;
    }

    /// Check if the session can run commands.
    pub fn can_execute(&self) -> bool {
        matches!(self, SessionState::Connected)
    }
}
