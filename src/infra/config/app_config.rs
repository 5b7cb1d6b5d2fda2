use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// Synchronization tunables. The defaults are empirically tuned; keep them
/// unless flicker or duplicate messages show up under real traffic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// Hold-back window for `roomUpdated` bursts, per room id.
    pub room_update_debounce_ms: u64,
    /// Two messages with equal content and sender within this window are
    /// the same logical message.
    pub duplicate_window_ms: i64,
    /// History page size for backward pagination.
    pub page_size: u32,
    /// Auto-dismiss delay for transient notices.
    pub notice_ttl_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            room_update_debounce_ms: 100,
            duplicate_window_ms: 1_000,
            page_size: 20,
            notice_ttl_ms: 5_000,
        }
    }
}

impl SyncConfig {
    pub fn room_update_debounce(&self) -> Duration {
        Duration::from_millis(self.room_update_debounce_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_tunables() {
        let config = SyncConfig::default();

        assert_eq!(config.room_update_debounce(), Duration::from_millis(100));
        assert_eq!(config.duplicate_window_ms, 1_000);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.notice_ttl(), Duration::from_secs(5));
    }
}
