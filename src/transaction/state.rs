// ABOUTME: Finite-state machine tracking one transaction from initialization to a terminal state
// ABOUTME: Terminal states are final; the only backwards edge is the bounded retry edge

use crate::gateway::MessageUri;
use crate::transaction::error::TransactionError;
use std::fmt;
use std::time::SystemTime;
use tracing::debug;

/// Lifecycle states.
///
/// ```text
/// INITIALIZED ──► PROCESSING ──► SUCCESS | FAILED
///      ▲               │
///      └─── retry ─────┘
/// INITIALIZED | PROCESSING ──► CANCELLED (cancel)
/// INITIALIZED | PROCESSING ──► FAILED    (mark_failed)
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum State {
    Initialized,
    Processing,
    Success,
    Failed,
    Cancelled,
}

impl State {
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Success | State::Failed | State::Cancelled)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Initialized => "INITIALIZED",
            State::Processing => "PROCESSING",
            State::Success => "SUCCESS",
            State::Failed => "FAILED",
            State::Cancelled => "CANCELLED",
        })
    }
}

/// State of one transaction plus its retry bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionState {
    state: State,
    error: Option<String>,
    content_uri: Option<MessageUri>,
    retry_count: u32,
    max_retry_count: u32,
    updated_at: SystemTime,
}

impl TransactionState {
    pub fn new(max_retry_count: u32) -> Self {
        Self {
            state: State::Initialized,
            error: None,
            content_uri: None,
            retry_count: 0,
            max_retry_count,
            updated_at: SystemTime::now(),
        }
    }

    /// Rebuild the state of a transaction that already used `retry_count` attempts.
    pub fn resumed(retry_count: u32, max_retry_count: u32) -> Self {
        Self {
            retry_count,
            ..Self::new(max_retry_count)
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn content_uri(&self) -> Option<&MessageUri> {
        self.content_uri.as_ref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn max_retry_count(&self) -> u32 {
        self.max_retry_count
    }

    pub fn updated_at(&self) -> SystemTime {
        self.updated_at
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retry_count && !self.is_completed()
    }

    /// Whether another attempt may start: not completed and the retry
    /// budget not overrun.
    pub fn can_process(&self) -> bool {
        !self.is_completed() && self.retry_count <= self.max_retry_count
    }

    fn transition(&mut self, to: State) {
        debug!(from = %self.state, %to, retry = self.retry_count, "transaction state change");
        self.state = to;
        self.updated_at = SystemTime::now();
    }

    fn invalid(&self, action: &'static str) -> TransactionError {
        TransactionError::InvalidTransition {
            from: self.state,
            action,
        }
    }

    /// INITIALIZED → PROCESSING
    pub fn begin(&mut self) -> Result<(), TransactionError> {
        if self.state != State::Initialized {
            return Err(self.invalid("begin"));
        }
        if self.retry_count > self.max_retry_count {
            return Err(TransactionError::RetryBudgetExhausted {
                retries: self.retry_count,
            });
        }
        self.transition(State::Processing);
        Ok(())
    }

    /// PROCESSING → SUCCESS
    pub fn succeed(&mut self, content_uri: MessageUri) -> Result<(), TransactionError> {
        if self.state != State::Processing {
            return Err(self.invalid("succeed"));
        }
        self.content_uri = Some(content_uri);
        self.error = None;
        self.transition(State::Success);
        Ok(())
    }

    /// PROCESSING → FAILED
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TransactionError> {
        if self.state != State::Processing {
            return Err(self.invalid("fail"));
        }
        self.error = Some(error.into());
        self.transition(State::Failed);
        Ok(())
    }

    /// PROCESSING → INITIALIZED, consuming one retry.
    pub fn retry(&mut self, error: impl Into<String>) -> Result<(), TransactionError> {
        if self.state != State::Processing {
            return Err(self.invalid("retry"));
        }
        if self.retry_count >= self.max_retry_count {
            return Err(TransactionError::RetryBudgetExhausted {
                retries: self.retry_count,
            });
        }
        self.retry_count += 1;
        self.error = Some(error.into());
        self.transition(State::Initialized);
        Ok(())
    }

    /// Fail immediately regardless of the remaining retry budget.
    ///
    /// Returns `false` when the state was already terminal.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> bool {
        if self.is_completed() {
            return false;
        }
        self.error = Some(reason.into());
        self.transition(State::Failed);
        true
    }

    /// Cancel immediately, whatever the retry count.
    ///
    /// Returns `false` when the state was already terminal.
    pub fn cancel(&mut self) -> bool {
        if self.is_completed() {
            return false;
        }
        self.transition(State::Cancelled);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> MessageUri {
        MessageUri::new("content://mms/sent/1")
    }

    #[test]
    fn starts_initialized_and_retryable() {
        let state = TransactionState::new(3);
        assert_eq!(state.state(), State::Initialized);
        assert!(!state.is_completed());
        assert!(state.can_retry());
        assert_eq!(state.retry_count(), 0);
    }

    #[test]
    fn happy_path_records_content_uri() {
        let mut state = TransactionState::new(3);
        state.begin().unwrap();
        assert_eq!(state.state(), State::Processing);
        state.succeed(uri()).unwrap();
        assert_eq!(state.state(), State::Success);
        assert_eq!(state.content_uri(), Some(&uri()));
        assert!(state.is_completed());
        assert!(!state.can_retry());
    }

    #[test]
    fn can_retry_until_budget_is_spent() {
        let mut state = TransactionState::new(3);
        for expected in 1..=3 {
            state.begin().unwrap();
            state.retry("network down").unwrap();
            assert_eq!(state.retry_count(), expected);
            assert_eq!(state.state(), State::Initialized);
        }
        assert!(!state.can_retry());
        state.begin().unwrap();
        assert!(matches!(
            state.retry("again"),
            Err(TransactionError::RetryBudgetExhausted { retries: 3 })
        ));
    }

    #[test]
    fn mark_failed_ignores_remaining_budget() {
        let mut state = TransactionState::new(3);
        assert!(state.mark_failed("draft missing"));
        assert!(state.is_completed());
        assert!(!state.can_retry());
        assert_eq!(state.state(), State::Failed);
        assert_eq!(state.error(), Some("draft missing"));
    }

    #[test]
    fn cancel_from_any_non_terminal_state() {
        let mut fresh = TransactionState::new(3);
        assert!(fresh.cancel());
        assert_eq!(fresh.state(), State::Cancelled);
        assert!(fresh.is_completed());
        assert_eq!(fresh.retry_count(), 0);

        let mut busy = TransactionState::new(3);
        busy.begin().unwrap();
        assert!(busy.cancel());
        assert_eq!(busy.state(), State::Cancelled);
    }

    #[test]
    fn terminal_states_are_final() {
        let mut state = TransactionState::new(3);
        state.cancel();
        assert!(!state.cancel());
        assert!(!state.mark_failed("late"));
        assert!(state.begin().is_err());
        assert_eq!(state.state(), State::Cancelled);

        let mut done = TransactionState::new(3);
        done.begin().unwrap();
        done.succeed(uri()).unwrap();
        assert!(done.fail("late").is_err());
        assert!(!done.cancel());
        assert_eq!(done.state(), State::Success);
    }

    #[test]
    fn overrun_budget_refuses_to_begin() {
        let mut state = TransactionState::resumed(4, 3);
        assert!(!state.can_process());
        assert!(state.begin().is_err());
        assert_eq!(state.state(), State::Initialized);
    }

    #[test]
    fn retry_count_never_decreases() {
        let mut state = TransactionState::new(2);
        let mut last = 0;
        state.begin().unwrap();
        state.retry("x").unwrap();
        assert!(state.retry_count() >= last);
        last = state.retry_count();
        state.begin().unwrap();
        state.fail("y").unwrap();
        assert!(state.retry_count() >= last);
    }
}
