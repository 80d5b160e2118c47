use std::path::{Path, PathBuf};

/// 待处理的内容条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    /// 单个 HTML / 文本文件
    Article { path: PathBuf },
    /// 贴图文件夹
    ImageSet { folder: PathBuf },
}

impl ContentItem {
    /// 条目在磁盘上的路径（归档时整体移动）
    pub fn path(&self) -> &Path {
        match self {
            ContentItem::Article { path } => path,
            ContentItem::ImageSet { folder } => folder,
        }
    }

    /// 文件名 / 文件夹名，用于日志和失败列表
    pub fn name(&self) -> String {
        self.path()
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// 草稿标题：文件名去掉扩展名，文件夹直接用文件夹名
    pub fn title(&self) -> String {
        match self {
            ContentItem::Article { path } => path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            ContentItem::ImageSet { .. } => self.name(),
        }
    }
}
