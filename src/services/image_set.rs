//! 贴图文件夹扫描
//!
//! 一个文件夹 = 一篇贴图：第一个 .txt 为说明文字，图片按文件名中的第一个数字排序

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{AppError, AppResult, ContentError};
use crate::services::image_rehost::has_image_extension;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// 扫描结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSetContent {
    pub text_file: PathBuf,
    pub images: Vec<PathBuf>,
}

/// 文件名中的第一个十进制数字，去掉前导零；数字本身不做解析，任意长度都可比较
pub fn first_number(name: &str) -> Option<&str> {
    NUMBER_RE.find(name).map(|m| {
        let digits = m.as_str().trim_start_matches('0');
        if digits.is_empty() {
            "0"
        } else {
            digits
        }
    })
}

/// 两个无前导零的数字串按数值比较
fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// 有数字的按数字升序，没有数字的排在最后；相同时按文件名
pub fn compare_image_names(a: &str, b: &str) -> Ordering {
    match (first_number(a), first_number(b)) {
        (Some(x), Some(y)) => compare_digits(x, y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn sort_images(images: &mut [PathBuf]) {
    images.sort_by(|a, b| compare_image_names(&file_name(a), &file_name(b)));
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// 扫描贴图文件夹
///
/// 没有 .txt 或没有图片都是内容错误
pub async fn scan_image_set(folder: &Path) -> AppResult<ImageSetContent> {
    let mut text_files = Vec::new();
    let mut images = Vec::new();

    let mut entries = tokio::fs::read_dir(folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder.display().to_string(), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder.display().to_string(), e))?
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = file_name(&path);
        if name.to_lowercase().ends_with(".txt") {
            text_files.push(path);
        } else if has_image_extension(&name) {
            images.push(path);
        }
    }

    text_files.sort();
    let text_file = text_files
        .into_iter()
        .next()
        .ok_or_else(|| ContentError::NoTextFile(folder.display().to_string()))?;

    if images.is_empty() {
        return Err(ContentError::NoImages(folder.display().to_string()).into());
    }
    sort_images(&mut images);

    Ok(ImageSetContent { text_file, images })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("img10.jpg"), Some("10"));
        assert_eq!(first_number("第3张_2x.png"), Some("3"));
        assert_eq!(first_number("007.png"), Some("7"));
        assert_eq!(first_number("000.png"), Some("0"));
        assert_eq!(first_number("cover.jpg"), None);
    }

    #[test]
    fn test_long_numbers_compare_by_value() {
        let huge = "photo_1234567890123456789012345.jpg";
        assert_eq!(compare_image_names("photo_99.jpg", huge), Ordering::Less);
        assert_eq!(compare_image_names(huge, "cover.jpg"), Ordering::Less);
        assert_eq!(
            compare_image_names(huge, "photo_1234567890123456789012346.jpg"),
            Ordering::Less
        );
        assert_eq!(compare_image_names("img007.png", "img8.png"), Ordering::Less);
    }

    #[test]
    fn test_numeric_not_lexical_order() {
        let mut images = vec![
            PathBuf::from("img2.jpg"),
            PathBuf::from("img10.jpg"),
            PathBuf::from("img1.jpg"),
        ];
        sort_images(&mut images);
        assert_eq!(
            images,
            vec![
                PathBuf::from("img1.jpg"),
                PathBuf::from("img2.jpg"),
                PathBuf::from("img10.jpg"),
            ]
        );
    }

    #[test]
    fn test_unnumbered_sort_last() {
        let mut images = vec![
            PathBuf::from("cover.jpg"),
            PathBuf::from("b3.png"),
            PathBuf::from("a.png"),
            PathBuf::from("x1.png"),
        ];
        sort_images(&mut images);
        let names: Vec<_> = images.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["x1.png", "b3.png", "a.png", "cover.jpg"]);
    }

    #[tokio::test]
    async fn test_scan_picks_first_text_and_sorted_images() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "p10.jpg", "p2.png", "notes.md"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let content = scan_image_set(dir.path()).await.unwrap();
        assert_eq!(content.text_file, dir.path().join("a.txt"));
        assert_eq!(
            content.images,
            vec![dir.path().join("p2.png"), dir.path().join("p10.jpg")]
        );
    }

    #[tokio::test]
    async fn test_scan_requires_text_and_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.jpg"), b"x").unwrap();
        assert!(matches!(
            scan_image_set(dir.path()).await,
            Err(AppError::Content(ContentError::NoTextFile(_)))
        ));

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"x").unwrap();
        assert!(matches!(
            scan_image_set(dir.path()).await,
            Err(AppError::Content(ContentError::NoImages(_)))
        ));
    }
}
