//! 账号配置
//!
//! 每一行账号表对应一个 `AccountConfig`，运行期间不可变

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::PathBuf;
use url::Url;

use crate::error::ConfigError;

/// 内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// 图文（单个 HTML / 文本文件）
    RichArticle,
    /// 贴图（每个子文件夹一篇：一个文本 + 若干图片）
    ImageSet,
}

impl ContentType {
    /// 从账号表单元格解析，空值视为图文
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "图文" | "文章" | "article" | "news" => Some(ContentType::RichArticle),
            "图片" | "贴图" | "图片消息" | "image" | "newspic" => Some(ContentType::ImageSet),
            _ => None,
        }
    }

    /// 统计记录中使用的标签
    pub fn label(self) -> &'static str {
        match self {
            ContentType::RichArticle => "图文",
            ContentType::ImageSet => "贴图",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 评论权限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentPermission {
    #[default]
    Everyone,
    FansOnly,
}

impl CommentPermission {
    pub fn parse(value: &str) -> Self {
        if value.trim() == "仅粉丝" {
            CommentPermission::FansOnly
        } else {
            CommentPermission::Everyone
        }
    }
}

/// 代理设置（SOCKS5，远端解析域名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    /// 生成 reqwest 可用的代理地址，用户名和密码按 URL 规则转义
    pub fn url(&self) -> Result<Url, ConfigError> {
        let invalid = || ConfigError::InvalidProxy(format!("{}:{}", self.host, self.port));
        let mut url =
            Url::parse(&format!("socks5h://{}:{}", self.host, self.port)).map_err(|_| invalid())?;
        if let (Some(user), Some(pass)) = (&self.username, &self.password) {
            url.set_username(user).map_err(|_| invalid())?;
            url.set_password(Some(pass)).map_err(|_| invalid())?;
        }
        Ok(url)
    }

    pub fn has_auth(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

/// 单个公众号账号配置
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub name: String,
    pub app_id: String,
    pub app_secret: String,
    pub author: String,
    pub content_folder: PathBuf,
    pub quota: usize,
    pub content_type: ContentType,
    pub is_original: bool,
    pub comment_enabled: bool,
    pub comment_permission: CommentPermission,
    pub proxy: Option<ProxyConfig>,
}

impl AccountConfig {
    /// 作者为空时使用“佚名”
    pub fn author_or_default(&self) -> &str {
        if self.author.trim().is_empty() {
            "佚名"
        } else {
            &self.author
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parse() {
        assert_eq!(ContentType::parse(""), Some(ContentType::RichArticle));
        assert_eq!(ContentType::parse(" 图文 "), Some(ContentType::RichArticle));
        assert_eq!(ContentType::parse("Image"), Some(ContentType::ImageSet));
        assert_eq!(ContentType::parse("贴图"), Some(ContentType::ImageSet));
        assert_eq!(ContentType::parse("视频"), None);
    }

    #[test]
    fn test_proxy_url_with_and_without_auth() {
        let mut proxy = ProxyConfig {
            host: "127.0.0.1".to_string(),
            port: 1080,
            username: None,
            password: None,
        };
        assert_eq!(proxy.url().unwrap().as_str(), "socks5h://127.0.0.1:1080");

        proxy.username = Some("u".to_string());
        proxy.password = Some("p".to_string());
        assert_eq!(proxy.url().unwrap().as_str(), "socks5h://u:p@127.0.0.1:1080");
    }

    #[test]
    fn test_proxy_credentials_are_escaped() {
        let proxy = ProxyConfig {
            host: "10.0.0.2".to_string(),
            port: 1080,
            username: Some("user@corp".to_string()),
            password: Some("p@ss:w/rd".to_string()),
        };
        let url = proxy.url().unwrap();
        assert_eq!(url.host_str(), Some("10.0.0.2"));
        assert_eq!(url.port(), Some(1080));
        assert_eq!(url.username(), "user%40corp");
        assert_eq!(url.password(), Some("p%40ss%3Aw%2Frd"));
    }

    #[test]
    fn test_proxy_with_bad_host_is_rejected() {
        let proxy = ProxyConfig {
            host: "bad host/".to_string(),
            port: 1080,
            username: None,
            password: None,
        };
        assert!(matches!(proxy.url(), Err(ConfigError::InvalidProxy(_))));
    }
}
