use serde::Deserialize;

use crate::infra::config::{AppConfig, LogConfig, SyncConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub sync: Option<FileSyncConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(sync) = self.sync {
            sync.merge_into(&mut config.sync);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSyncConfig {
    pub room_update_debounce_ms: Option<u64>,
    pub duplicate_window_ms: Option<i64>,
    pub page_size: Option<u32>,
    pub notice_ttl_ms: Option<u64>,
}

impl FileSyncConfig {
    fn merge_into(self, config: &mut SyncConfig) {
        if let Some(debounce_ms) = self.room_update_debounce_ms {
            config.room_update_debounce_ms = debounce_ms;
        }

        if let Some(window_ms) = self.duplicate_window_ms {
            config.duplicate_window_ms = window_ms;
        }

        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }

        if let Some(ttl_ms) = self.notice_ttl_ms {
            config.notice_ttl_ms = ttl_ms;
        }
    }
}
