//! Per-request operation context carrying a deadline and a cancellation flag.
//!
//! Repository adapters check the context before every statement they issue
//! inside a transaction. Once the deadline passes or the caller cancels, the
//! next check fails and the surrounding transaction rolls back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Reason an operation stopped before completing.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OperationAborted {
    /// The caller cancelled the operation.
    #[error("operation was cancelled")]
    Cancelled,
    /// The operation deadline elapsed.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation and deadline signal shared between a caller and the store.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use taskdesk::context::{OperationAborted, OperationContext};
///
/// let ctx = OperationContext::with_timeout(Duration::from_secs(5));
/// assert!(ctx.ensure_active().is_ok());
///
/// ctx.cancel();
/// assert_eq!(ctx.ensure_active(), Err(OperationAborted::Cancelled));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl OperationContext {
    /// Creates a context with no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Creates a context that expires after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::default(),
        }
    }

    /// Creates a context that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: Arc::default(),
        }
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Signals cancellation to every clone of this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once the context has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails when the context was cancelled or its deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`OperationAborted::Cancelled`] or
    /// [`OperationAborted::DeadlineExceeded`].
    pub fn ensure_active(&self) -> Result<(), OperationAborted> {
        if self.is_cancelled() {
            return Err(OperationAborted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(OperationAborted::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
