//! 内容处理上下文
//!
//! 封装"我正在处理哪个账号的第几篇"这一信息

use std::fmt::Display;

/// 单篇内容的处理上下文，只用于日志
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 账号名称
    pub account_name: String,

    /// 内容在本次配额中的序号（从1开始）
    pub item_index: usize,

    /// 本次计划处理的总数
    pub total: usize,

    /// 文件名或文件夹名
    pub item_name: String,
}

impl ItemCtx {
    pub fn new(account_name: &str, item_index: usize, total: usize, item_name: String) -> Self {
        Self {
            account_name: account_name.to_string(),
            item_index,
            total,
            item_name,
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[账号 {} {}/{}]",
            self.account_name, self.item_index, self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefix() {
        let ctx = ItemCtx::new("号1", 2, 5, "a.html".to_string());
        assert_eq!(ctx.to_string(), "[账号 号1 2/5]");
    }
}
