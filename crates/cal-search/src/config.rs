use cal_types::{CalResult, SearchError};
use serde::{Deserialize, Serialize};

/// Concurrency settings for a grid-search run. Where results go is the
/// result writer's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Total thread budget; also the number of chunks each grid is split into.
    pub threads: usize,

    /// Maximum number of grids a reader takes from the task stream at once.
    pub batch_size: usize,

    /// Reader count override. Defaults to a fifth of the thread budget.
    pub readers: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(threads)
    }
}

impl SearchConfig {
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            batch_size: 1,
            readers: None,
        }
    }

    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn with_readers(mut self, n: usize) -> Self {
        self.readers = Some(n);
        self
    }

    /// Number of concurrent readers: the override, else `ceil(threads / 5)`,
    /// never less than one.
    pub fn reader_count(&self) -> usize {
        self.readers
            .unwrap_or_else(|| self.threads.div_ceil(5))
            .max(1)
    }

    pub fn validate(&self) -> CalResult<()> {
        let invalid = |message: &str| -> CalResult<()> {
            Err(SearchError::InvalidConfig {
                message: message.to_string(),
            }
            .into())
        };
        if self.threads == 0 {
            return invalid("thread budget must be at least 1");
        }
        if self.batch_size == 0 {
            return invalid("batch size must be at least 1");
        }
        if self.readers == Some(0) {
            return invalid("reader count must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_count_is_a_fifth_of_threads_rounded_up() {
        assert_eq!(SearchConfig::new(1).reader_count(), 1);
        assert_eq!(SearchConfig::new(5).reader_count(), 1);
        assert_eq!(SearchConfig::new(6).reader_count(), 2);
        assert_eq!(SearchConfig::new(16).reader_count(), 4);
        assert_eq!(SearchConfig::new(16).with_readers(3).reader_count(), 3);
    }

    #[test]
    fn builder_chain() {
        let config = SearchConfig::new(8)
            .with_batch_size(4)
            .with_readers(2);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.readers, Some(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_settings_rejected() {
        assert!(SearchConfig::new(0).validate().is_err());
        assert!(SearchConfig::new(4).with_batch_size(0).validate().is_err());
        assert!(SearchConfig::new(4).with_readers(0).validate().is_err());
    }

    #[test]
    fn default_uses_available_parallelism() {
        let config = SearchConfig::default();
        assert!(config.threads >= 1);
        assert_eq!(config.batch_size, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SearchConfig::new(4).with_batch_size(2);
        let json = serde_json::to_string(&config).unwrap();
        let back: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn config_carries_only_concurrency_settings() {
        let json = serde_json::to_value(SearchConfig::new(4).with_readers(2)).unwrap();
        let mut keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["batch_size", "readers", "threads"]);
    }
}
