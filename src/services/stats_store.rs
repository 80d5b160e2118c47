//! 统计历史存储
//!
//! 单个 JSON 文件 `{"history": [...]}`，每次保存整体覆盖。
//! 只追加，不修改已有记录；同一账号多次运行会产生多条记录。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};
use crate::models::StatsRecord;

/// CSV 导出表头
pub const CSV_HEADER: [&str; 7] = ["时间", "账号名称", "内容类型", "成功数", "失败数", "总数", "失败列表"];

/// 失败列表在 CSV 中的分隔符
pub const FAILED_ITEMS_DELIMITER: &str = "; ";

#[derive(Debug, Default, Deserialize)]
struct StatsDocument {
    #[serde(default)]
    history: Vec<StatsRecord>,
}

#[derive(Serialize)]
struct StatsDocumentRef<'a> {
    history: &'a [StatsRecord],
}

/// 统计历史存储
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部历史，文件不存在时为空
    pub fn load(&self) -> AppResult<Vec<StatsRecord>> {
        if !self.path.exists() {
            debug!("统计文件不存在，视为空历史: {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| AppError::file_read_failed(self.path.display().to_string(), e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: StatsDocument =
            serde_json::from_str(&content).map_err(|source| FileError::StatsCorrupted {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(document.history)
    }

    /// 整体覆盖写入
    pub fn save(&self, history: &[StatsRecord]) -> AppResult<()> {
        let content = serde_json::to_string_pretty(&StatsDocumentRef { history }).map_err(|source| {
            FileError::StatsCorrupted {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }

        std::fs::write(&self.path, content)
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e))
    }

    /// 追加一条记录（读取-修改-写回）
    pub fn append(&self, record: StatsRecord) -> AppResult<()> {
        let mut history = self.load()?;
        history.push(record);
        self.save(&history)
    }

    /// 清空历史
    pub fn clear(&self) -> AppResult<()> {
        self.save(&[])?;
        info!("统计历史已清空: {}", self.path.display());
        Ok(())
    }

    /// 导出为 CSV，返回导出的记录数
    pub fn export_csv(&self, output: &Path) -> AppResult<usize> {
        let history = self.load()?;
        let csv_error = |source: csv::Error| FileError::CsvFailed {
            path: output.display().to_string(),
            source,
        };

        let mut writer = csv::Writer::from_path(output).map_err(csv_error)?;
        writer.write_record(CSV_HEADER).map_err(csv_error)?;
        for record in &history {
            writer.write_record(flatten(record)).map_err(csv_error)?;
        }
        writer
            .flush()
            .map_err(|e| AppError::file_write_failed(output.display().to_string(), e))?;

        info!("已导出 {} 条统计记录到 {}", history.len(), output.display());
        Ok(history.len())
    }
}

/// 一条记录展开为 CSV 的七列
pub fn flatten(record: &StatsRecord) -> [String; 7] {
    [
        record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        record.account_name.clone(),
        record.content_type.clone(),
        record.success_count.to_string(),
        record.failure_count.to_string(),
        record.total().to_string(),
        record.failed_items.join(FAILED_ITEMS_DELIMITER),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, ProcessingStats};

    fn record(account: &str, success: usize, failed: &[&str]) -> StatsRecord {
        let mut stats = ProcessingStats::default();
        for _ in 0..success {
            stats.record_success();
        }
        for name in failed {
            stats.record_failure(*name);
        }
        stats.into_record(account, ContentType::RichArticle)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path().join("stats.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_is_additive_and_clear_resets() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path().join("stats.json"));

        store.append(record("号1", 2, &[])).unwrap();
        store.append(record("号1", 1, &["坏.html"])).unwrap();
        store.append(record("号2", 0, &["x", "y"])).unwrap();

        let history = store.load().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].failed_items, vec!["坏.html"]);
        assert_eq!(history[2].total(), 2);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let store = StatsStore::new(&path);
        store.append(record("号1", 1, &[])).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["history"].as_array().unwrap().len(), 1);
        assert_eq!(value["history"][0]["account_name"], "号1");
    }

    #[test]
    fn test_corrupted_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            StatsStore::new(&path).load(),
            Err(AppError::File(FileError::StatsCorrupted { .. }))
        ));
    }

    #[test]
    fn test_export_csv_seven_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path().join("stats.json"));
        store.append(record("号1", 1, &["a.html", "b.html"])).unwrap();

        let output = dir.path().join("out.csv");
        assert_eq!(store.export_csv(&output).unwrap(), 1);

        let mut reader = csv::Reader::from_path(&output).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 7);
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[1], "号1");
        assert_eq!(&row[5], "3");
        assert_eq!(&row[6], "a.html; b.html");
    }
}
