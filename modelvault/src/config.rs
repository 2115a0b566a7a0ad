//! Configuration for the archival pipeline.

use std::time::Duration;

/// Configuration consumed by the pipeline core.
///
/// All values are supplied by the caller; nothing is read from the
/// environment here.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bearer credential attached to every download request.
    ///
    /// Absence is tolerated only if the remote resource does not require
    /// authentication; otherwise the download surfaces an HTTP 401.
    pub token: Option<String>,

    /// Maximum download attempts per file.
    pub max_retries: u32,

    /// Fixed delay between download attempts after a transient failure.
    pub retry_delay: Duration,

    /// Worker pool size for task execution.
    pub max_threads: usize,

    /// Whether verified artifacts are compressed into `.7z` archives.
    pub compression_enabled: bool,

    /// Read timeout for each HTTP attempt.
    pub timeout: Duration,

    /// Connect timeout for each HTTP attempt.
    pub connect_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            token: None,
            max_retries: 5,
            retry_delay: Duration::from_secs(10),
            max_threads: 5,
            compression_enabled: true,
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the download attempt budget (minimum 1).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the delay between download attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the worker pool size (minimum 1).
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads.max(1);
        self
    }

    /// Enable or disable compression of verified artifacts.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression_enabled = enabled;
        self
    }

    /// Set the HTTP read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the HTTP connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.token.is_none());
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_secs(10));
        assert_eq!(config.max_threads, 5);
        assert!(config.compression_enabled);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_token("secret")
            .with_max_retries(8)
            .with_retry_delay(Duration::from_secs(20))
            .with_max_threads(3)
            .with_compression(false)
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.max_retries, 8);
        assert_eq!(config.retry_delay, Duration::from_secs(20));
        assert_eq!(config.max_threads, 3);
        assert!(!config.compression_enabled);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_enforces_minimums() {
        let config = PipelineConfig::new().with_max_retries(0).with_max_threads(0);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.max_threads, 1);
    }
}
