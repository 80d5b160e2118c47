//! 贴图处理流程 - 流程层
//!
//! 流程顺序：
//! 1. 扫描文件夹（说明文字 + 按编号排序的图片）
//! 2. 逐张上传，单张失败跳过
//! 3. 至少一张成功才组装 "newspic" 草稿并提交

use std::path::Path;

use tracing::{info, warn};

use crate::clients::DraftApi;
use crate::error::{AppError, AppResult, ContentError};
use crate::models::{AccountConfig, CommentPermission, DraftArticle, DraftPayload, ImageInfo};
use crate::services::text_normalize::{normalize_caption, normalize_chars};
use crate::services::{scan_image_set, ImageSource};
use crate::workflow::{submit_draft, ItemCtx, ProcessResult};

/// 贴图处理流程
#[derive(Debug, Default)]
pub struct ImageSetFlow;

impl ImageSetFlow {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(
        &self,
        api: &dyn DraftApi,
        token: &str,
        account: &AccountConfig,
        folder: &Path,
        ctx: &ItemCtx,
    ) -> AppResult<ProcessResult> {
        let content = scan_image_set(folder).await?;
        info!(
            "{} 📝 说明文件: {}，图片 {} 张",
            ctx,
            content.text_file.display(),
            content.images.len()
        );

        let bytes = tokio::fs::read(&content.text_file)
            .await
            .map_err(|e| AppError::file_read_failed(content.text_file.display().to_string(), e))?;
        let caption = normalize_caption(&String::from_utf8_lossy(&bytes));

        let media_ids = self.upload_images(api, token, &content.images, ctx).await;
        if media_ids.is_empty() {
            return Err(ContentError::AllUploadsFailed {
                attempted: content.images.len(),
            }
            .into());
        }
        info!(
            "{} ✓ 图片上传完成: {}/{}",
            ctx,
            media_ids.len(),
            content.images.len()
        );

        let title = folder
            .file_name()
            .map(|n| normalize_chars(&n.to_string_lossy()).trim().to_string())
            .unwrap_or_default();

        let payload = DraftPayload::single(build_article(account, title, caption, &media_ids));
        submit_draft(api, token, &payload, ctx).await
    }

    /// 按顺序上传，返回成功的素材 ID
    async fn upload_images(
        &self,
        api: &dyn DraftApi,
        token: &str,
        images: &[std::path::PathBuf],
        ctx: &ItemCtx,
    ) -> Vec<String> {
        let mut media_ids = Vec::with_capacity(images.len());

        for (index, image) in images.iter().enumerate() {
            let source = ImageSource::Local(image.clone());
            info!(
                "{}   上传第 {}/{} 张: {}",
                ctx,
                index + 1,
                images.len(),
                source.upload_file_name()
            );

            let data = match tokio::fs::read(image).await {
                Ok(data) => data,
                Err(e) => {
                    warn!("{}   ⚠️ 读取图片失败，跳过: {} ({})", ctx, image.display(), e);
                    continue;
                }
            };

            match api.upload_image(token, &source.upload_file_name(), data).await {
                Ok(result) => media_ids.push(result.media_id),
                Err(e) => warn!("{}   ⚠️ 图片上传失败，跳过: {}", ctx, e),
            }
        }

        media_ids
    }
}

fn build_article(
    account: &AccountConfig,
    title: String,
    caption: String,
    media_ids: &[String],
) -> DraftArticle {
    DraftArticle {
        article_type: "newspic",
        title,
        author: None,
        digest: None,
        content: caption,
        thumb_media_id: None,
        need_open_comment: u8::from(account.comment_enabled),
        only_fans_can_comment: u8::from(
            account.comment_enabled && account.comment_permission == CommentPermission::FansOnly,
        ),
        is_original: None,
        image_info: Some(ImageInfo::from_media_ids(media_ids)),
    }
}
