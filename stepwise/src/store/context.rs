use crate::errors::{ErrorKind, MigrateError, MigrateResult};
use std::time::{Duration, Instant};

/// Deadline carried into a single storage call.
///
/// The runner creates a fresh context for every read, write and delete, so a
/// slow call only ever consumes its own budget.
///
/// ```rust
/// use std::time::Duration;
/// use stepwise::store::OperationContext;
///
/// let ctx = OperationContext::with_timeout(Duration::from_secs(2));
/// assert!(!ctx.is_expired());
/// assert!(ctx.check("find_one").is_ok());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OperationContext {
    deadline: Option<Instant>,
    timeout: Option<Duration>,
}

impl OperationContext {
    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        OperationContext {
            deadline: Instant::now().checked_add(timeout),
            timeout: Some(timeout),
        }
    }

    /// A context without deadline.
    pub fn unbounded() -> Self {
        OperationContext {
            deadline: None,
            timeout: None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Time left before the deadline; `None` for unbounded contexts.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Fails with [ErrorKind::Timeout] once the deadline has passed.
    pub fn check(&self, operation: &str) -> MigrateResult<()> {
        if self.is_expired() {
            log::error!(
                "Deadline of {:?} exceeded before {} completed",
                self.timeout.unwrap_or_default(),
                operation
            );
            return Err(MigrateError::new(
                &format!(
                    "Deadline of {:?} exceeded before {} completed",
                    self.timeout.unwrap_or_default(),
                    operation
                ),
                ErrorKind::Timeout,
            ));
        }
        Ok(())
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        OperationContext::unbounded()
    }
}
