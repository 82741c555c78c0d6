//! Cooperative cancellation
//!
//! A one-shot signal split capability-style: the [`CancelToken`] is
//! handed to the request pipeline for observation, the [`Canceller`]
//! stays with whoever may abort the call. Once tripped the reason is
//! immutable and later trips are no-ops.

use tokio::sync::watch;

use crate::error::Error;

/// Observer half of a cancellation pair.
///
/// A token may outlive a single request and be shared across calls;
/// each dispatch observes it independently.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<Option<String>>,
}

/// Trigger half of a cancellation pair.
#[derive(Debug)]
pub struct Canceller {
    tx: watch::Sender<Option<String>>,
}

impl CancelToken {
    /// Creates a new token/trigger pair.
    #[must_use]
    pub fn source() -> (Self, Canceller) {
        let (tx, rx) = watch::channel(None);
        (Self { rx }, Canceller { tx })
    }

    /// Returns the cancellation reason, if the token has been tripped.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.rx.borrow().clone()
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Fails immediately with a cancellation error if the token is
    /// already tripped.
    ///
    /// Called before any network side effect to short-circuit requests
    /// cancelled before they started.
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorKind::Cancelled`](crate::ErrorKind::Cancelled)
    /// error carrying the reason.
    pub fn throw_if_requested(&self) -> Result<(), Error> {
        match self.reason() {
            Some(reason) => Err(Error::cancelled(reason)),
            None => Ok(()),
        }
    }

    /// Resolves with the reason once cancellation is requested.
    ///
    /// If the [`Canceller`] is dropped without tripping, this future
    /// never resolves; the request then settles on transport outcome
    /// alone.
    pub async fn cancelled(&self) -> String {
        let mut rx = self.rx.clone();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(reason) = current {
                return reason;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Canceller {
    /// Requests cancellation with the given reason.
    ///
    /// Only the first call takes effect; the reason never changes
    /// afterwards.
    pub fn cancel(&self, reason: impl Into<String>) {
        self.tx.send_if_modified(|state| {
            if state.is_some() {
                return false;
            }
            *state = Some(reason.into());
            true
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pending_token_passes_check() {
        let (token, _canceller) = CancelToken::source();
        assert!(!token.is_cancelled());
        assert!(token.throw_if_requested().is_ok());
    }

    #[test]
    fn test_tripped_token_fails_check_with_reason() {
        let (token, canceller) = CancelToken::source();
        canceller.cancel("operation aborted by user");

        let error = token.throw_if_requested().unwrap_err();
        assert!(error.is_cancelled());
        assert_eq!(error.message, "operation aborted by user");
    }

    #[test]
    fn test_second_cancel_is_a_no_op() {
        let (token, canceller) = CancelToken::source();
        canceller.cancel("first");
        canceller.cancel("second");
        assert_eq!(token.reason().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_cancelled_resolves_with_reason() {
        let (token, canceller) = CancelToken::source();
        let waiter = tokio::spawn(async move { token.cancelled().await });

        canceller.cancel("stop");
        assert_eq!(waiter.await.unwrap(), "stop");
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_when_already_tripped() {
        let (token, canceller) = CancelToken::source();
        canceller.cancel("early");
        assert_eq!(token.cancelled().await, "early");
    }
}
