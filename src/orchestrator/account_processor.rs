//! 单个账号处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单个账号的所有待发内容，是账号级别的编排器。
//!
//! ## 处理顺序
//!
//! `路径检查 → 配额检查 → 列出内容 → 获取 token → 逐篇处理 → 生成统计`
//!
//! 前四步任一失败，账号被跳过，不产生统计记录。
//! token 放在列出内容之后获取，没有内容时不请求平台。

use std::path::Path;

use tracing::{error, info, warn};

use crate::clients::DraftApi;
use crate::config::Config;
use crate::models::{AccountConfig, ContentItem, ContentType, ProcessingStats, StatsRecord};
use crate::services::{enumerate_items, Archiver, Capabilities};
use crate::workflow::{ArticleFlow, ImageSetFlow, ItemCtx, ProcessResult};

/// 账号处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum AccountOutcome {
    /// 账号被跳过（路径无效、配额为0、没有内容、token 获取失败）
    Skipped { reason: String },
    /// 已处理，附统计记录
    Completed(StatsRecord),
}

/// 单篇内容的流程，按账号内容类型选择
enum ItemFlow {
    Article(ArticleFlow),
    ImageSet(ImageSetFlow),
}

/// 处理单个账号
///
/// # 参数
/// - `api`: 平台接口（已按账号代理构建）
/// - `account`: 账号配置
/// - `config`: 全局配置
/// - `capabilities`: 可选能力
///
/// # 返回
/// 返回跳过原因或统计记录；单篇内容的错误不会向上传播
pub async fn process_account(
    api: &dyn DraftApi,
    account: &AccountConfig,
    config: &Config,
    capabilities: Capabilities,
) -> AccountOutcome {
    let folder = account.content_folder.as_path();

    // ========== 路径检查 ==========
    if !folder.is_dir() {
        return skip(account, format!("存稿路径不存在或不是文件夹: {}", folder.display()));
    }

    // ========== 配额检查 ==========
    if account.quota == 0 {
        return skip(account, "存稿数量为0".to_string());
    }

    // ========== 列出内容 ==========
    let items = match enumerate_items(folder, account.content_type, &config.archive_folder_name).await {
        Ok(items) => items,
        Err(e) => return skip(account, format!("读取存稿目录失败: {}", e)),
    };
    if items.is_empty() {
        return skip(account, format!("没有待处理的{}内容", account.content_type));
    }

    let planned = items.len().min(account.quota);
    info!(
        "[账号 {}] ✓ 找到 {} 个待处理内容，本次处理 {} 个",
        account.name,
        items.len(),
        planned
    );

    // ========== 获取 token ==========
    info!("[账号 {}] 🔑 正在获取 access_token...", account.name);
    let token = match api.fetch_token(&account.app_id, &account.app_secret).await {
        Ok(token) => token,
        Err(e) => return skip(account, format!("获取 access_token 失败: {}", e)),
    };
    info!("[账号 {}] ✓ access_token 获取成功", account.name);

    // ========== 逐篇处理 ==========
    let flow = match account.content_type {
        ContentType::RichArticle => ItemFlow::Article(ArticleFlow::new(config, capabilities)),
        ContentType::ImageSet => ItemFlow::ImageSet(ImageSetFlow::new()),
    };
    let archiver = Archiver::new(&config.archive_folder_name);
    let mut stats = ProcessingStats::default();

    for (index, item) in items.into_iter().take(planned).enumerate() {
        let ctx = ItemCtx::new(&account.name, index + 1, planned, item.name());
        info!("\n{} {}", ctx, "─".repeat(30));
        info!("{} 处理: {}", ctx, ctx.item_name);

        let result = match (&flow, &item) {
            (ItemFlow::Article(flow), ContentItem::Article { path }) => {
                flow.run(api, &token, account, path, &ctx).await
            }
            (ItemFlow::ImageSet(flow), ContentItem::ImageSet { folder }) => {
                flow.run(api, &token, account, folder, &ctx).await
            }
            _ => {
                // enumerate_items 只会返回与内容类型一致的条目
                warn!("{} ⚠️ 内容类型不匹配，跳过", ctx);
                stats.record_failure(ctx.item_name.clone());
                continue;
            }
        };

        match result {
            Ok(ProcessResult::Success { .. }) => {
                stats.record_success();
                archive_item(&archiver, &item, folder, &ctx).await;
            }
            Ok(ProcessResult::Failed { reason }) => {
                warn!("{} ❌ 处理失败: {}", ctx, reason);
                stats.record_failure(ctx.item_name.clone());
            }
            Err(e) => {
                error!("{} ❌ 处理失败: {}", ctx, e);
                stats.record_failure(ctx.item_name.clone());
            }
        }
    }

    info!(
        "[账号 {}] 内容统计: 成功 {}, 失败 {}, 总计 {}",
        account.name,
        stats.success,
        stats.failed,
        stats.attempted()
    );

    AccountOutcome::Completed(stats.into_record(&account.name, account.content_type))
}

/// 归档成功的内容，失败只记录日志，不影响成功计数
async fn archive_item(archiver: &Archiver, item: &ContentItem, folder: &Path, ctx: &ItemCtx) {
    match archiver.archive(item, folder).await {
        Ok(destination) => info!("{} 📁 已归档: {}", ctx, destination.display()),
        Err(e) => error!("{} ⚠️ 草稿已创建，但归档失败: {}", ctx, e),
    }
}

fn skip(account: &AccountConfig, reason: String) -> AccountOutcome {
    warn!("[账号 {}] ⏭️ 跳过: {}", account.name, reason);
    AccountOutcome::Skipped { reason }
}
