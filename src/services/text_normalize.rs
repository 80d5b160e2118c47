//! 字符规范化
//!
//! 平台内容过滤会拒绝部分不可见字符、特殊空白和 emoji 变体选择符，
//! 提交前统一替换。

use regex::Regex;
use std::sync::LazyLock;

/// 摘要最大字符数
pub const DIGEST_MAX_CHARS: usize = 54;

/// 需要替换的字符表
const CHAR_REPLACEMENTS: &[(char, &str)] = &[
    // 零宽字符与 BOM
    ('\u{200B}', ""),
    ('\u{200C}', ""),
    ('\u{200D}', ""),
    ('\u{2060}', ""),
    ('\u{FEFF}', ""),
    ('\u{00AD}', ""),
    // emoji 变体选择符
    ('\u{FE0E}', ""),
    ('\u{FE0F}', ""),
    // 特殊空白
    ('\u{00A0}', " "),
    ('\u{2002}', " "),
    ('\u{2003}', " "),
    ('\u{2009}', " "),
    ('\u{200A}', " "),
    ('\u{202F}', " "),
    ('\u{3000}', " "),
    // 行/段分隔符
    ('\u{2028}', "\n"),
    ('\u{2029}', "\n"),
    // 连字符与短横统一为 ASCII 减号；破折号 U+2014 与省略号 U+2026 保留
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2012}', "-"),
    ('\u{2013}', "-"),
    ('\u{2015}', "\u{2014}"),
    // 点号前导符
    ('\u{2024}', "."),
    ('\u{2025}', ".."),
];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

fn replacement_for(c: char) -> Option<&'static str> {
    CHAR_REPLACEMENTS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// 按字符表替换
pub fn normalize_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match replacement_for(c) {
            Some(to) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

/// 贴图说明文字：字符替换 + 去掉首尾空白，不做标签清理
pub fn normalize_caption(text: &str) -> String {
    normalize_chars(text).trim().to_string()
}

/// 去掉标签并解码实体，空白折叠为单个空格
pub fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    let text = html_escape::decode_html_entities(&text);
    WS_RE.replace_all(&text, " ").trim().to_string()
}

/// 摘要：纯文本前 DIGEST_MAX_CHARS 个字符
pub fn make_digest(html: &str) -> String {
    strip_tags(html).chars().take(DIGEST_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_chars_removes_invisible_and_maps_spaces() {
        let input = "A\u{200B}B\u{00A0}C\u{3000}D\u{FE0F}\u{2028}E";
        assert_eq!(normalize_chars(input), "AB C D\nE");
    }

    #[test]
    fn test_normalize_chars_keeps_ordinary_text() {
        let input = "你好，世界！“引号”—— ok";
        assert_eq!(normalize_chars(input), input);
    }

    #[test]
    fn test_normalize_chars_maps_dashes_and_leaders() {
        let input = "2020\u{2013}2024 e\u{2010}mail \u{2011}\u{2012} 引\u{2015}\u{2015}文 a\u{2024}b\u{2025}";
        assert_eq!(normalize_chars(input), "2020-2024 e-mail -- 引——文 a.b..");
    }

    #[test]
    fn test_caption_is_trimmed_not_stripped() {
        assert_eq!(normalize_caption("\u{FEFF}  <b>春天</b>  \n"), "<b>春天</b>");
    }

    #[test]
    fn test_strip_tags_and_entities() {
        let html = "<p>第一段&nbsp;<b>加粗</b></p>\n<p>a &amp; b</p>";
        assert_eq!(strip_tags(html), "第一段 加粗 a & b");
        assert_eq!(strip_tags("<p>&ldquo;引&rdquo;&#x4E2D;&lt;1&gt;</p>"), "“引”中<1>");
    }

    #[test]
    fn test_digest_is_char_prefix() {
        let body = format!("<p>{}</p>", "字".repeat(100));
        let digest = make_digest(&body);
        assert_eq!(digest.chars().count(), DIGEST_MAX_CHARS);
        assert!(digest.chars().all(|c| c == '字'));
    }
}
