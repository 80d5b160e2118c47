//! 归档服务 - 业务能力层
//!
//! 只负责把已成功存稿的文件/文件夹移入归档子目录

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};
use crate::models::ContentItem;

/// 归档服务
pub struct Archiver {
    folder_name: String,
}

impl Archiver {
    pub fn new(folder_name: impl Into<String>) -> Self {
        Self {
            folder_name: folder_name.into(),
        }
    }

    /// 归档目录（不保证存在）
    pub fn archive_dir(&self, content_folder: &Path) -> PathBuf {
        content_folder.join(&self.folder_name)
    }

    /// 移动条目到归档目录，目录不存在时创建
    ///
    /// 目标已存在同名条目时追加时间戳，不覆盖旧文件
    ///
    /// # 返回
    /// 返回归档后的路径
    pub async fn archive(&self, item: &ContentItem, content_folder: &Path) -> AppResult<PathBuf> {
        let archive_dir = self.archive_dir(content_folder);
        if !archive_dir.exists() {
            tokio::fs::create_dir_all(&archive_dir)
                .await
                .map_err(|e| AppError::file_write_failed(archive_dir.display().to_string(), e))?;
            info!("    创建文件夹: {}", archive_dir.display());
        }

        let mut destination = archive_dir.join(item.name());
        if destination.exists() {
            let suffix = chrono::Local::now().format("%Y%m%d%H%M%S");
            let renamed = match item {
                ContentItem::Article { path } => match path.extension() {
                    Some(ext) => format!("{}_{}.{}", item.title(), suffix, ext.to_string_lossy()),
                    None => format!("{}_{}", item.title(), suffix),
                },
                ContentItem::ImageSet { .. } => format!("{}_{}", item.name(), suffix),
            };
            debug!("归档目标已存在，改名为: {}", renamed);
            destination = archive_dir.join(renamed);
        }

        tokio::fs::rename(item.path(), &destination)
            .await
            .map_err(|source| FileError::MoveFailed {
                from: item.path().display().to_string(),
                to: destination.display().to_string(),
                source,
            })?;

        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_archive_creates_folder_and_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("文章.html");
        std::fs::write(&path, "<p>x</p>").unwrap();

        let archiver = Archiver::new("已发内容");
        let item = ContentItem::Article { path: path.clone() };
        let moved = archiver.archive(&item, dir.path()).await.unwrap();

        assert!(!path.exists());
        assert_eq!(moved, dir.path().join("已发内容").join("文章.html"));
        assert!(moved.exists());
    }

    #[tokio::test]
    async fn test_archive_does_not_overwrite_existing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("done");
        std::fs::create_dir(&archive).unwrap();
        std::fs::write(archive.join("a.html"), "old").unwrap();
        std::fs::write(dir.path().join("a.html"), "new").unwrap();

        let archiver = Archiver::new("done");
        let item = ContentItem::Article {
            path: dir.path().join("a.html"),
        };
        let moved = archiver.archive(&item, dir.path()).await.unwrap();

        assert_ne!(moved, archive.join("a.html"));
        assert_eq!(std::fs::read_to_string(archive.join("a.html")).unwrap(), "old");
        assert_eq!(std::fs::read_to_string(moved).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_archive_moves_whole_folder() {
        let dir = tempfile::tempdir().unwrap();
        let post = dir.path().join("post1");
        std::fs::create_dir(&post).unwrap();
        std::fs::write(post.join("a.txt"), "x").unwrap();

        let archiver = Archiver::new("已发内容");
        let moved = archiver
            .archive(&ContentItem::ImageSet { folder: post.clone() }, dir.path())
            .await
            .unwrap();

        assert!(!post.exists());
        assert!(moved.join("a.txt").exists());
    }
}
