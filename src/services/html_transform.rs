//! HTML 正文处理
//!
//! 按固定顺序处理图文正文：
//! 1. CSS 内联（可选能力，不可用时原样返回）
//! 2. 外部图片替换（见 `image_rehost`，这里只提供收集和改写 src）
//! 3. 清理平台不接受的标签、属性和链接
//! 4. 字符规范化（见 `text_normalize`）

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// 直接删除（连同内容）的元素
const DISALLOWED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "form", "input", "button", "select",
    "textarea", "link", "meta", "head", "title", "mpcps",
];

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static EMPTY_P_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<p\b[^>]*>\s*(?:&nbsp;|<br\s*/?>|\s)*\s*</p>").expect("valid regex")
});
static EMPTY_SPAN_P_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<p\b[^>]*>\s*<span\b[^>]*>\s*<br\b[^>]*>\s*</span>\s*</p>").expect("valid regex")
});
static BR_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\s*<br\s*/?>\s*){2,}").expect("valid regex"));
static INTER_TAG_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").expect("valid regex"));

/// 可选能力，启动时检测一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// CSS 内联（cargo feature `css-inline`）
    pub css_inline: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self {
            css_inline: cfg!(feature = "css-inline"),
        }
    }

    /// 所有可选能力都关闭
    pub fn none() -> Self {
        Self { css_inline: false }
    }

    pub fn log(&self) {
        if self.css_inline {
            info!("✓ CSS 内联可用");
        } else {
            warn!("⚠️ CSS 内联不可用，HTML 样式内联将跳过");
        }
    }
}

/// 把 <style> 中的规则内联到元素 style 属性
///
/// 能力不可用或内联出错时返回原始 HTML
pub fn inline_css(html: &str, capabilities: Capabilities) -> String {
    if !capabilities.css_inline {
        debug!("CSS 内联不可用，跳过");
        return html.to_string();
    }

    match inline_with_library(html) {
        Ok(inlined) => inlined,
        Err(e) => {
            warn!("CSS 内联失败: {}，使用原始HTML", e);
            html.to_string()
        }
    }
}

#[cfg(feature = "css-inline")]
fn inline_with_library(html: &str) -> Result<String, String> {
    let inliner = css_inline::CSSInliner::options()
        .keep_style_tags(true)
        .build();
    inliner.inline(html).map_err(|e| e.to_string())
}

#[cfg(not(feature = "css-inline"))]
fn inline_with_library(html: &str) -> Result<String, String> {
    Ok(html.to_string())
}

/// 执行一次 lol_html 改写，出错时返回原文
fn rewrite_html(html: &str, settings: lol_html::Settings<'_, '_>) -> String {
    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(settings, |c: &[u8]| {
        output.extend_from_slice(c);
    });

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    String::from_utf8_lossy(&output).into_owned()
}

/// 属性原文中的实体解码后作为图片引用
///
/// `&amp;` 等实体在 CSS 内联前后写法可能不同，统一用解码后的值比较和下载
pub fn decode_attribute(value: &str) -> String {
    html_escape::decode_html_entities(value.trim()).into_owned()
}

/// 按文档顺序收集所有 <img> 的图片引用（src，缺失时取 data-src），已解码实体
pub fn collect_image_sources(html: &str) -> Vec<String> {
    let mut sources = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("img", |el| {
                let src = el
                    .get_attribute("src")
                    .filter(|s| !s.trim().is_empty())
                    .or_else(|| el.get_attribute("data-src"))
                    .map(|s| decode_attribute(&s))
                    .filter(|s| !s.is_empty());
                if let Some(src) = src {
                    sources.push(src);
                }
                Ok(())
            })],
            ..Default::default()
        },
        |_: &[u8]| {},
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return Vec::new();
    }
    if rewriter.end().is_err() {
        return Vec::new();
    }

    sources
}

/// 把图片引用替换为新的地址，未出现在映射中的保持不变
///
/// 映射的键是解码后的引用（见 `decode_attribute`）
pub fn rewrite_image_sources(html: &str, replacements: &HashMap<String, String>) -> String {
    if replacements.is_empty() {
        return html.to_string();
    }

    rewrite_html(
        html,
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("img", |el| {
                if let Some(new_src) = el
                    .get_attribute("src")
                    .and_then(|src| replacements.get(&decode_attribute(&src)))
                {
                    el.set_attribute("src", new_src)?;
                } else if let Some(new_src) = el
                    .get_attribute("data-src")
                    .and_then(|src| replacements.get(&decode_attribute(&src)))
                {
                    el.set_attribute("src", new_src)?;
                    el.remove_attribute("data-src");
                }
                Ok(())
            })],
            ..Default::default()
        },
    )
}

/// 清理平台不接受的内容
///
/// - 删除脚本、样式、表单、嵌入等元素
/// - 删除小程序标签（`mp-*`）和 `data-miniprogram-*` 属性
/// - 删除事件属性（`on*`）和脚本协议链接
/// - 去掉 html/body 外壳与注释
pub fn sanitize_html(html: &str) -> String {
    let without_comments = COMMENT_RE.replace_all(html, "");

    let mut handlers: Vec<_> = DISALLOWED_ELEMENTS
        .iter()
        .map(|tag| {
            lol_html::element!(*tag, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    for wrapper in ["html", "body"] {
        handlers.push(lol_html::element!(wrapper, |el| {
            el.remove_and_keep_content();
            Ok(())
        }));
    }

    handlers.push(lol_html::element!("*", |el| {
        if el.tag_name().starts_with("mp-") {
            el.remove();
            return Ok(());
        }

        let doomed: Vec<String> = el
            .attributes()
            .iter()
            .filter(|attr| is_disallowed_attribute(&attr.name(), &attr.value()))
            .map(|attr| attr.name())
            .collect();
        for name in doomed {
            el.remove_attribute(&name);
        }
        Ok(())
    }));

    rewrite_html(
        &without_comments,
        lol_html::Settings {
            element_content_handlers: handlers,
            ..Default::default()
        },
    )
}

fn is_disallowed_attribute(name: &str, value: &str) -> bool {
    let name = name.to_lowercase();
    if name.starts_with("on") || name.starts_with("data-miniprogram") {
        return true;
    }
    if matches!(name.as_str(), "href" | "src" | "action" | "formaction") {
        let value = decode_attribute(value).to_lowercase();
        return value.starts_with("javascript:") || value.starts_with("vbscript:");
    }
    false
}

/// 删除空段落、合并连续换行、去掉标签间空白
pub fn collapse_whitespace(html: &str) -> String {
    let html = EMPTY_P_RE.replace_all(html, "");
    let html = EMPTY_SPAN_P_RE.replace_all(&html, "");
    let html = BR_RUN_RE.replace_all(&html, "<br>");
    INTER_TAG_WS_RE.replace_all(&html, "><").trim().to_string()
}
