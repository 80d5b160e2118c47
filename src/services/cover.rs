//! 封面选择
//!
//! 按文档顺序逐个尝试候选图片，第一张上传成功的作为封面；
//! 全部失败则该篇内容失败（平台要求图文必须有封面）。

use tracing::{info, warn};

use crate::error::{AppResult, ContentError};
use crate::models::UploadResult;
use crate::services::image_rehost::ImageRehoster;

/// 选中的封面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    /// HTML 中的原始引用
    pub reference: String,
    pub upload: UploadResult,
}

/// 去重并保持文档顺序
pub fn cover_candidates(sources: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    sources
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// 依次尝试候选封面
pub async fn select_cover(rehoster: &ImageRehoster<'_>, candidates: &[String]) -> AppResult<Cover> {
    for (index, reference) in candidates.iter().enumerate() {
        info!("    尝试第 {}/{} 个封面候选", index + 1, candidates.len());
        match rehoster.upload(reference).await {
            Ok(upload) => {
                return Ok(Cover {
                    reference: reference.clone(),
                    upload,
                });
            }
            Err(e) => warn!("    封面候选失败: {}", e),
        }
    }

    Err(ContentError::NoCover {
        attempted: candidates.len(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_candidates_dedup_keeps_order() {
        let sources = vec![
            "b.png".to_string(),
            "a.png".to_string(),
            "b.png".to_string(),
            "c.png".to_string(),
        ];
        assert_eq!(cover_candidates(sources), vec!["b.png", "a.png", "c.png"]);
    }
}
