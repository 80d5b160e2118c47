use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{ContentItem, ContentType};

const ARTICLE_EXTENSIONS: &[&str] = &["html", "htm", "txt"];

/// 列出存稿目录中待处理的内容，按名称排序
///
/// 归档文件夹和隐藏文件不计入
pub async fn enumerate_items(
    folder: &Path,
    content_type: ContentType,
    archive_folder_name: &str,
) -> AppResult<Vec<ContentItem>> {
    let read_error = |e| AppError::file_read_failed(folder.display().to_string(), e);

    let mut items = Vec::new();
    let mut entries = tokio::fs::read_dir(folder).await.map_err(read_error)?;

    while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || name == archive_folder_name {
            continue;
        }

        match content_type {
            ContentType::RichArticle if path.is_file() => {
                let is_article = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| ARTICLE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false);
                if is_article {
                    items.push(ContentItem::Article { path });
                }
            }
            ContentType::ImageSet if path.is_dir() => items.push(ContentItem::ImageSet { folder: path }),
            _ => debug!("忽略: {}", name),
        }
    }

    items.sort_by_key(|item| item.name());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_article_mode_lists_html_and_txt_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.html", "a.TXT", "c.md", ".hidden.html"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("已发内容")).unwrap();
        std::fs::create_dir(dir.path().join("sub.html")).unwrap();

        let items = enumerate_items(dir.path(), ContentType::RichArticle, "已发内容")
            .await
            .unwrap();
        let names: Vec<_> = items.iter().map(ContentItem::name).collect();
        assert_eq!(names, vec!["a.TXT", "b.html"]);
    }

    #[tokio::test]
    async fn test_image_set_mode_lists_folders_except_archive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["post2", "post1", "已发内容"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("stray.txt"), "x").unwrap();

        let items = enumerate_items(dir.path(), ContentType::ImageSet, "已发内容")
            .await
            .unwrap();
        let names: Vec<_> = items.iter().map(ContentItem::name).collect();
        assert_eq!(names, vec!["post1", "post2"]);
    }
}
