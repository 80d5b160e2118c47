//! 草稿提交
//!
//! 图文和贴图共用的最后一步

use tracing::{info, warn};

use crate::clients::{error_codes, DraftApi};
use crate::error::{ApiError, AppError, AppResult};
use crate::models::DraftPayload;
use crate::workflow::{ItemCtx, ProcessResult};

/// 提交草稿
///
/// 平台返回错误码时查表记录原因，返回 `ProcessResult::Failed`；
/// 网络或解析错误原样返回，由调用方计为失败
pub async fn submit_draft(
    api: &dyn DraftApi,
    token: &str,
    payload: &DraftPayload,
    ctx: &ItemCtx,
) -> AppResult<ProcessResult> {
    info!("{} 📤 正在提交草稿...", ctx);

    match api.create_draft(token, payload).await {
        Ok(draft_id) => {
            match &draft_id {
                Some(id) => info!("{} ✓ 草稿创建成功，Media ID: {}", ctx, id),
                None => info!("{} ✓ 草稿创建成功", ctx),
            }
            Ok(ProcessResult::Success { draft_id })
        }
        Err(AppError::Api(ApiError::BadResponse { code, message, .. })) => {
            let explanation = code.map(error_codes::explain).unwrap_or("未返回错误码");
            warn!(
                "{} ⚠️ 草稿创建失败: errcode={:?}, errmsg={}, 说明: {}",
                ctx,
                code,
                message.as_deref().unwrap_or(""),
                explanation
            );
            Ok(ProcessResult::Failed {
                reason: format!("草稿创建失败: {}", explanation),
            })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DraftArticle, UploadResult};
    use async_trait::async_trait;

    /// 只实现草稿接口，按给定错误码拒绝
    struct RejectingApi {
        code: Option<i64>,
    }

    #[async_trait]
    impl DraftApi for RejectingApi {
        async fn fetch_token(&self, _: &str, _: &str) -> AppResult<String> {
            Ok("t".to_string())
        }

        async fn download_image(&self, _: &str) -> AppResult<Vec<u8>> {
            Ok(Vec::new())
        }

        async fn upload_image(&self, _: &str, _: &str, _: Vec<u8>) -> AppResult<UploadResult> {
            Ok(UploadResult {
                media_id: "m".to_string(),
                url: None,
            })
        }

        async fn create_draft(&self, _: &str, _: &DraftPayload) -> AppResult<Option<String>> {
            match self.code {
                Some(0) => Ok(Some("d1".to_string())),
                code => Err(ApiError::BadResponse {
                    endpoint: "draft/add".to_string(),
                    code,
                    message: Some("invalid".to_string()),
                }
                .into()),
            }
        }
    }

    fn payload() -> DraftPayload {
        DraftPayload::single(DraftArticle {
            article_type: "news",
            title: "t".to_string(),
            author: None,
            digest: None,
            content: "c".to_string(),
            thumb_media_id: Some("m".to_string()),
            need_open_comment: 0,
            only_fans_can_comment: 0,
            is_original: Some(0),
            image_info: None,
        })
    }

    #[test]
    fn test_bad_response_becomes_failed_result() {
        let ctx = ItemCtx::new("号1", 1, 1, "a.html".to_string());

        let api = RejectingApi { code: Some(45166) };
        let result = tokio_test::block_on(submit_draft(&api, "t", &payload(), &ctx)).unwrap();
        match result {
            ProcessResult::Failed { reason } => assert!(reason.contains("正文内容校验失败")),
            other => panic!("应该失败: {:?}", other),
        }

        let api = RejectingApi { code: Some(0) };
        let result = tokio_test::block_on(submit_draft(&api, "t", &payload(), &ctx)).unwrap();
        assert_eq!(
            result,
            ProcessResult::Success {
                draft_id: Some("d1".to_string())
            }
        );
    }
}
