use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::account::ContentType;

/// 单个账号一次运行的统计记录，写入历史后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub timestamp: DateTime<Local>,
    pub account_name: String,
    pub content_type: String,
    pub success_count: usize,
    pub failure_count: usize,
    #[serde(default)]
    pub failed_items: Vec<String>,
}

impl StatsRecord {
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }
}

/// 处理过程中的计数器
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub failed_items: Vec<String>,
}

impl ProcessingStats {
    pub fn record_success(&mut self) {
        self.success += 1;
    }

    pub fn record_failure(&mut self, item_name: impl Into<String>) {
        self.failed += 1;
        self.failed_items.push(item_name.into());
    }

    pub fn attempted(&self) -> usize {
        self.success + self.failed
    }

    /// 生成带时间戳的历史记录
    pub fn into_record(self, account_name: &str, content_type: ContentType) -> StatsRecord {
        StatsRecord {
            timestamp: Local::now(),
            account_name: account_name.to_string(),
            content_type: content_type.label().to_string(),
            success_count: self.success,
            failure_count: self.failed,
            failed_items: self.failed_items,
        }
    }
}
