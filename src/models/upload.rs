use serde::Deserialize;

/// 永久素材上传结果
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    pub media_id: String,
    /// 图片素材的公开地址，可用于正文
    #[serde(default)]
    pub url: Option<String>,
}
