use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{DraftPayload, UploadResult};

/// 平台接口能力
///
/// 流程层只依赖这个 trait，不直接持有 HTTP 客户端
#[async_trait]
pub trait DraftApi: Send + Sync {
    /// 用 AppID / AppSecret 换取 access_token
    async fn fetch_token(&self, app_id: &str, app_secret: &str) -> AppResult<String>;

    /// 下载外部图片
    async fn download_image(&self, url: &str) -> AppResult<Vec<u8>>;

    /// 上传永久图片素材
    async fn upload_image(&self, token: &str, file_name: &str, data: Vec<u8>) -> AppResult<UploadResult>;

    /// 新建草稿，成功时返回草稿 media_id（平台未返回时为 None）
    async fn create_draft(&self, token: &str, payload: &DraftPayload) -> AppResult<Option<String>>;
}
