use std::time::Duration;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRY_COUNT: u32 = 3;

/// Default message expiry: seven days
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Whether an incoming notification is fetched right away
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AutoDownload {
    #[default]
    Always,
    /// Leave the message pending at the MMSC until the user asks for it
    Never,
}

/// Per-transaction settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionConfig {
    pub max_retry_count: u32,
    /// Base delay; the n-th retry waits `retry_backoff * 2^(n-1)`
    pub retry_backoff: Duration,
    pub download_policy: AutoDownload,
    /// Local sender address used when a draft has no From
    pub line_number: Option<String>,
    /// Relative expiry applied when a draft has none
    pub default_expiry: Duration,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            retry_backoff: Duration::from_secs(1),
            download_policy: AutoDownload::Always,
            line_number: None,
            default_expiry: DEFAULT_EXPIRY,
        }
    }
}

impl TransactionConfig {
    pub fn with_max_retry_count(mut self, max_retry_count: u32) -> Self {
        self.max_retry_count = max_retry_count;
        self
    }

    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn with_download_policy(mut self, policy: AutoDownload) -> Self {
        self.download_policy = policy;
        self
    }

    pub fn with_line_number(mut self, line_number: impl Into<String>) -> Self {
        self.line_number = Some(line_number.into());
        self
    }

    pub fn with_default_expiry(mut self, expiry: Duration) -> Self {
        self.default_expiry = expiry;
        self
    }

    /// Delay before the attempt following retry number `retry_count`.
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        if retry_count == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(retry_count - 1).unwrap_or(u32::MAX);
        self.retry_backoff.saturating_mul(factor)
    }
}

/// Worker service settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Transactions allowed to run at the same time
    pub max_concurrent: usize,
    pub transaction: TransactionConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            transaction: TransactionConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_transaction(mut self, transaction: TransactionConfig) -> Self {
        self.transaction = transaction;
        self
    }
}
