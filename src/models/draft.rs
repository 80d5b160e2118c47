//! 草稿请求体
//!
//! 字段名与平台 `draft/add` 接口保持一致

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DraftPayload {
    pub articles: Vec<DraftArticle>,
}

impl DraftPayload {
    pub fn single(article: DraftArticle) -> Self {
        Self {
            articles: vec![article],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftArticle {
    /// "news" 图文 / "newspic" 贴图
    pub article_type: &'static str,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_media_id: Option<String>,
    pub need_open_comment: u8,
    pub only_fans_can_comment: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_original: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_info: Option<ImageInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub image_list: Vec<ImageEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageEntry {
    pub image_media_id: String,
}

impl ImageInfo {
    pub fn from_media_ids(ids: &[String]) -> Self {
        Self {
            image_list: ids
                .iter()
                .map(|id| ImageEntry {
                    image_media_id: id.clone(),
                })
                .collect(),
        }
    }
}
