use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 程序配置
///
/// 优先级：命令行参数 > 环境变量 > 配置文件 > 默认值
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 平台 API 根地址
    pub api_base_url: String,
    /// 平台自有图片域名（正文中这些域名的图片不重新上传）
    pub platform_image_domains: Vec<String>,
    /// 已处理内容的归档子文件夹名
    pub archive_folder_name: String,
    /// 统计历史文件
    pub stats_file: String,
    /// 普通 GET 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 创建草稿请求超时（秒）
    pub draft_timeout_secs: u64,
    /// 素材上传超时（秒）
    pub upload_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.weixin.qq.com/cgi-bin".to_string(),
            platform_image_domains: vec![
                "mmbiz.qlogo.cn".to_string(),
                "mmbiz.qpic.cn".to_string(),
            ],
            archive_folder_name: "已发内容".to_string(),
            stats_file: "draft_stats.json".to_string(),
            request_timeout_secs: 30,
            draft_timeout_secs: 60,
            upload_timeout_secs: 120,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 配置文件加载，缺省字段使用默认值，之后再叠加环境变量
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let config: Config = toml::from_str(&content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
        })?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("WECHAT_API_BASE_URL").unwrap_or(self.api_base_url),
            platform_image_domains: self.platform_image_domains,
            archive_folder_name: std::env::var("ARCHIVE_FOLDER_NAME").unwrap_or(self.archive_folder_name),
            stats_file: std::env::var("STATS_FILE").unwrap_or(self.stats_file),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            draft_timeout_secs: std::env::var("DRAFT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.draft_timeout_secs),
            upload_timeout_secs: std::env::var("UPLOAD_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.upload_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn draft_timeout(&self) -> Duration {
        Duration::from_secs(self.draft_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}
