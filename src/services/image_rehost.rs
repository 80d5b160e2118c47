//! 图片转存服务 - 业务能力层
//!
//! 把正文或封面引用的图片（外部链接或本地文件）上传为平台永久素材

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use url::Url;

use crate::clients::DraftApi;
use crate::error::{AppError, AppResult, ContentError};
use crate::models::UploadResult;
use crate::services::html_transform::{collect_image_sources, rewrite_image_sources};
use crate::utils::logging::truncate_text;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// 图片引用解析后的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(Url),
    Local(PathBuf),
}

impl ImageSource {
    /// 解析图片引用
    ///
    /// - `http(s)://` 与 `//` 开头视为远程图片
    /// - `file://` 与其它相对/绝对路径视为本地文件（相对于 `base_dir`）
    /// - `data:` 内联图片无法上传，返回 None
    pub fn resolve(reference: &str, base_dir: &Path) -> Option<Self> {
        let reference = reference.trim();
        if reference.is_empty() || reference.starts_with("data:") {
            return None;
        }

        if let Some(rest) = reference.strip_prefix("//") {
            return Url::parse(&format!("https://{}", rest)).ok().map(ImageSource::Remote);
        }

        match Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(ImageSource::Remote(url)),
            Ok(url) if url.scheme() == "file" => url.to_file_path().ok().map(ImageSource::Local),
            // Windows 盘符路径会被解析成单字母 scheme
            Ok(url) if url.scheme().len() > 1 => None,
            _ => Some(ImageSource::Local(base_dir.join(reference))),
        }
    }

    /// 是否为平台自有域名的图片
    pub fn is_platform_hosted(&self, domains: &[String]) -> bool {
        match self {
            ImageSource::Remote(url) => url
                .host_str()
                .map(|host| {
                    let host = host.to_lowercase();
                    domains.iter().any(|d| host.contains(d.as_str()))
                })
                .unwrap_or(false),
            ImageSource::Local(_) => false,
        }
    }

    /// 上传时使用的文件名，决定平台识别的图片类型
    pub fn upload_file_name(&self) -> String {
        match self {
            ImageSource::Remote(url) => {
                // 平台图片链接通过 wx_fmt 标明格式
                if let Some((_, fmt)) = url.query_pairs().find(|(k, _)| k == "wx_fmt") {
                    return format!("image.{}", fmt.to_lowercase());
                }
                url.path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .filter(|name| has_image_extension(name))
                    .map(str::to_string)
                    .unwrap_or_else(|| "image.jpg".to_string())
            }
            ImageSource::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .filter(|name| has_image_extension(name))
                .unwrap_or_else(|| "image.jpg".to_string()),
        }
    }
}

pub fn has_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// 图片转存服务
///
/// 职责：
/// - 下载远程图片 / 读取本地图片
/// - 上传为永久素材
/// - 只处理单篇内容的图片，不关心账号循环
pub struct ImageRehoster<'a> {
    api: &'a dyn DraftApi,
    token: &'a str,
    base_dir: &'a Path,
    platform_domains: &'a [String],
}

impl<'a> ImageRehoster<'a> {
    pub fn new(
        api: &'a dyn DraftApi,
        token: &'a str,
        base_dir: &'a Path,
        platform_domains: &'a [String],
    ) -> Self {
        Self {
            api,
            token,
            base_dir,
            platform_domains,
        }
    }

    /// 读取图片内容
    async fn fetch(&self, source: &ImageSource) -> AppResult<Vec<u8>> {
        match source {
            ImageSource::Remote(url) => {
                debug!("下载图片: {}", url);
                self.api.download_image(url.as_str()).await
            }
            ImageSource::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e)),
        }
    }

    /// 上传单张图片
    ///
    /// # 参数
    /// - `reference`: HTML 中的图片引用
    ///
    /// # 返回
    /// 返回平台素材信息
    pub async fn upload(&self, reference: &str) -> AppResult<UploadResult> {
        let source = ImageSource::resolve(reference, self.base_dir)
            .ok_or_else(|| ContentError::UnresolvableImage(reference.to_string()))?;
        self.upload_source(&source).await
    }

    pub async fn upload_source(&self, source: &ImageSource) -> AppResult<UploadResult> {
        let data = self.fetch(source).await?;
        let result = self
            .api
            .upload_image(self.token, &source.upload_file_name(), data)
            .await?;
        info!(
            "    素材上传成功！Media ID: {}{}",
            result.media_id,
            result
                .url
                .as_deref()
                .map(|u| format!(", URL: {}", u))
                .unwrap_or_default()
        );
        Ok(result)
    }

    /// 替换正文中的外部图片
    ///
    /// 平台域名以外的图片逐一转存，失败的保留原链接继续处理。
    /// `known` 是已经转存过的引用（例如封面），不会重复上传。
    pub async fn rehost_body_images(&self, html: &str, known: HashMap<String, String>) -> String {
        let mut replacements = known;
        let mut found = 0;
        let mut replaced = 0;

        for reference in collect_image_sources(html) {
            let Some(source) = ImageSource::resolve(&reference, self.base_dir) else {
                continue;
            };
            if source.is_platform_hosted(self.platform_domains) {
                continue;
            }

            found += 1;
            info!(
                "      处理第{}个外部图片: {}",
                found,
                truncate_text(&reference, 70)
            );

            if replacements.contains_key(&reference) {
                replaced += 1;
                continue;
            }

            match self.upload_source(&source).await {
                Ok(UploadResult { url: Some(url), .. }) => {
                    info!("        成功替换为平台图片URL: {}", url);
                    replacements.insert(reference, url);
                    replaced += 1;
                }
                Ok(_) => warn!("        上传未返回URL，保留原始src"),
                Err(e) => warn!("        转存失败，保留原始src: {}", e),
            }
        }

        if found > 0 {
            info!("    共找到{}个外部图片链接，成功处理了{}个", found, replaced);
        }

        rewrite_image_sources(html, &replacements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains() -> Vec<String> {
        vec!["mmbiz.qpic.cn".to_string(), "mmbiz.qlogo.cn".to_string()]
    }

    #[test]
    fn test_resolve_sources() {
        let base = Path::new("/posts");
        assert!(matches!(
            ImageSource::resolve("https://a.com/x.png", base),
            Some(ImageSource::Remote(_))
        ));
        assert_eq!(
            ImageSource::resolve("//cdn.a.com/x.png", base),
            Some(ImageSource::Remote(Url::parse("https://cdn.a.com/x.png").unwrap()))
        );
        assert_eq!(
            ImageSource::resolve("img/x.png", base),
            Some(ImageSource::Local(PathBuf::from("/posts/img/x.png")))
        );
        assert_eq!(ImageSource::resolve("data:image/png;base64,AAAA", base), None);
        assert_eq!(ImageSource::resolve("mailto:a@b.c", base), None);
    }

    #[test]
    fn test_platform_hosted_matches_subdomain() {
        let base = Path::new("/");
        let hosted = ImageSource::resolve("https://mmbiz.qpic.cn/mmbiz_png/abc/640", base).unwrap();
        let external = ImageSource::resolve("https://example.com/a.png", base).unwrap();
        assert!(hosted.is_platform_hosted(&domains()));
        assert!(!external.is_platform_hosted(&domains()));
    }

    #[test]
    fn test_upload_file_name() {
        let base = Path::new("/");
        let wx = ImageSource::resolve("https://mmbiz.qpic.cn/a/640?wx_fmt=PNG&from=appmsg", base).unwrap();
        assert_eq!(wx.upload_file_name(), "image.png");

        let named = ImageSource::resolve("https://a.com/pics/cat.gif?x=1", base).unwrap();
        assert_eq!(named.upload_file_name(), "cat.gif");

        let bare = ImageSource::resolve("https://a.com/pics/123", base).unwrap();
        assert_eq!(bare.upload_file_name(), "image.jpg");
    }

    #[test]
    fn test_upload_file_name_from_escaped_markup() {
        let html = r#"<p><img src="https://mmbiz.qpic.cn/a/640?from=appmsg&amp;wx_fmt=png"></p>"#;
        let reference = collect_image_sources(html).remove(0);
        let source = ImageSource::resolve(&reference, Path::new("/")).unwrap();
        assert_eq!(source.upload_file_name(), "image.png");
    }
}
