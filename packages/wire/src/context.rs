//! Cancellation and deadlines for long conversions.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why an operation stopped before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Cancelled {
    /// The context's cancellation token was triggered.
    #[error("operation cancelled")]
    Cancelled,
    /// The context's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation token and optional deadline threaded through every
/// conversion and decode call.
///
/// Cancellation is cooperative: container conversions call [`Context::check`]
/// between elements and stop with [`Cancelled`] once it fails. Nothing here
/// blocks or preempts.
///
/// Cloning is cheap and clones observe the same token.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tfattr_wire::{Cancelled, Context};
///
/// let ctx = Context::background().with_timeout(Duration::from_secs(5));
/// assert!(ctx.check().is_ok());
///
/// ctx.cancel();
/// assert_eq!(ctx.check(), Err(Cancelled::Cancelled));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context with a fresh token and no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context observing an existing token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set an absolute deadline. An earlier existing deadline wins.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Set a deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A context cancelled whenever this one is, that can also be
    /// cancelled on its own without affecting the parent.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check whether work should stop.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.token.is_cancelled() {
            return Err(Cancelled::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Cancelled::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
