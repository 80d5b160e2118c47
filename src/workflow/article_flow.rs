//! 图文处理流程 - 流程层
//!
//! 核心职责：定义"一篇图文"的完整处理流程
//!
//! 流程顺序：
//! 1. 读取 HTML，按文档顺序选封面（全部失败则不提交）
//! 2. CSS 内联 → 外部图片转存 → 清理标签 → 空白整理 → 字符规范化
//! 3. 生成摘要，组装 "news" 草稿并提交

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::clients::DraftApi;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{AccountConfig, CommentPermission, DraftArticle, DraftPayload};
use crate::services::html_transform::{
    collapse_whitespace, collect_image_sources, inline_css, sanitize_html,
};
use crate::services::text_normalize::{make_digest, normalize_chars};
use crate::services::{cover_candidates, select_cover, Capabilities, ImageRehoster};
use crate::utils::logging::truncate_text;
use crate::workflow::{submit_draft, ItemCtx, ProcessResult};

/// 图文处理流程
///
/// - 编排单篇图文的处理顺序
/// - 不持有 HTTP 客户端，只依赖 `DraftApi`
/// - 不负责归档和统计（由编排层处理）
pub struct ArticleFlow {
    platform_domains: Vec<String>,
    capabilities: Capabilities,
    verbose_logging: bool,
}

impl ArticleFlow {
    pub fn new(config: &Config, capabilities: Capabilities) -> Self {
        Self {
            platform_domains: config.platform_image_domains.clone(),
            capabilities,
            verbose_logging: config.verbose_logging,
        }
    }

    pub async fn run(
        &self,
        api: &dyn DraftApi,
        token: &str,
        account: &AccountConfig,
        path: &Path,
        ctx: &ItemCtx,
    ) -> AppResult<ProcessResult> {
        let raw = read_html(path).await?;
        let base_dir = path.parent().unwrap_or(account.content_folder.as_path());
        let rehoster = ImageRehoster::new(api, token, base_dir, &self.platform_domains);

        // ========== 封面 ==========
        let candidates = cover_candidates(collect_image_sources(&raw));
        info!("{} 🖼️ 找到 {} 个封面候选", ctx, candidates.len());
        let cover = select_cover(&rehoster, &candidates).await?;
        info!(
            "{} ✓ 封面上传成功: {}",
            ctx,
            truncate_text(&cover.reference, 70)
        );

        // ========== 正文 ==========
        let html = inline_css(&raw, self.capabilities);

        // 封面已经上传过，直接复用
        let mut known = HashMap::new();
        if let Some(url) = &cover.upload.url {
            known.insert(cover.reference.clone(), url.clone());
        }
        let html = rehoster.rehost_body_images(&html, known).await;

        let html = collapse_whitespace(&sanitize_html(&html));
        let content = normalize_chars(&html);
        let digest = make_digest(&content);

        if self.verbose_logging {
            debug!("{} 摘要: {}", ctx, digest);
            debug!("{} 正文长度: {} 字符", ctx, content.chars().count());
        }

        let payload = DraftPayload::single(self.build_article(
            account,
            title_for(path),
            content,
            digest,
            cover.upload.media_id,
        ));

        submit_draft(api, token, &payload, ctx).await
    }

    /// 构建草稿数据
    fn build_article(
        &self,
        account: &AccountConfig,
        title: String,
        content: String,
        digest: String,
        thumb_media_id: String,
    ) -> DraftArticle {
        DraftArticle {
            article_type: "news",
            title,
            author: Some(account.author_or_default().to_string()),
            digest: (!digest.is_empty()).then_some(digest),
            content,
            thumb_media_id: Some(thumb_media_id),
            need_open_comment: u8::from(account.comment_enabled),
            only_fans_can_comment: u8::from(
                account.comment_enabled && account.comment_permission == CommentPermission::FansOnly,
            ),
            is_original: Some(u8::from(account.is_original)),
            image_info: None,
        }
    }
}

/// 读取文件，非 UTF-8 字节按替换字符处理
async fn read_html(path: &Path) -> AppResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_start_matches('\u{FEFF}').to_string())
}

/// 标题取文件名（不含扩展名）
fn title_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    normalize_chars(&stem).trim().to_string()
}
