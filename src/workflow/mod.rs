pub mod article_flow;
pub mod draft_submit;
pub mod image_set_flow;
pub mod item_ctx;

pub use article_flow::ArticleFlow;
pub use draft_submit::submit_draft;
pub use image_set_flow::ImageSetFlow;
pub use item_ctx::ItemCtx;

/// 单篇内容处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 草稿已创建
    Success { draft_id: Option<String> },
    /// 平台拒绝
    Failed { reason: String },
}

impl ProcessResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessResult::Success { .. })
    }
}
