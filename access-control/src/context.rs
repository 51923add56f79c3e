//! Request context
//!
//! Carries the caller's cancellation signal and deadline into the permission
//! pipeline. The engine has no timeouts of its own: it checks the context
//! before starting each step and stops with [`PermissionError::Cancelled`] or
//! [`PermissionError::DeadlineExceeded`] when the caller has given up.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{PermissionError, PermissionResult};

/// Per-request cancellation and deadline.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A child context cancelled together with this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Token collaborators can select on while doing blocking work.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fail if the caller has cancelled or the deadline has passed.
    ///
    /// # Errors
    ///
    /// [`PermissionError::Cancelled`] or [`PermissionError::DeadlineExceeded`].
    pub fn check(&self) -> PermissionResult<()> {
        if self.token.is_cancelled() {
            return Err(PermissionError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(PermissionError::DeadlineExceeded);
        }
        Ok(())
    }
}
