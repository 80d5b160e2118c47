/// 日志工具模块
///
/// 提供启动信息、账号分隔和最终统计的格式化输出
use tracing::info;

use crate::config::Config;
use crate::models::{AccountConfig, StatsRecord};
use crate::services::Capabilities;

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置
/// - `capabilities`: 启动时检测到的可选能力
pub fn log_startup(config: &Config, capabilities: Capabilities) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 公众号批量存稿");
    info!("🌐 API 地址: {}", config.api_base_url);
    info!("📁 归档文件夹: {}", config.archive_folder_name);
    info!("📊 统计文件: {}", config.stats_file);
    capabilities.log();
    info!("{}", "=".repeat(60));
}

/// 记录账号表加载信息
pub fn log_accounts_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的账号", total);
    info!("💡 账号按表格顺序依次处理\n");
}

/// 记录账号开始处理
///
/// # 参数
/// - `index`: 账号序号（从1开始）
/// - `total`: 账号总数
/// - `account`: 账号配置
pub fn log_account_start(index: usize, total: usize, account: &AccountConfig) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 个账号: {}", index, total, account.name);
    info!(
        "📄 类型: {} | 存稿数量: {} | 路径: {}",
        account.content_type,
        account.quota,
        account.content_folder.display()
    );
    if let Some(proxy) = &account.proxy {
        info!(
            "🔌 使用代理: {}:{}{}",
            proxy.host,
            proxy.port,
            if proxy.has_auth() { " (带认证)" } else { "" }
        );
    }
    info!("{}", "=".repeat(60));
}

/// 记录单个账号完成
pub fn log_account_complete(record: &StatsRecord) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 账号 {} 完成: 成功 {}/{}",
        record.account_name,
        record.success_count,
        record.total()
    );
    if !record.failed_items.is_empty() {
        info!("❌ 失败列表: {}", record.failed_items.join(", "));
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `records`: 本次运行产生的统计记录
/// - `skipped_accounts`: 被跳过的账号数
pub fn print_final_stats(records: &[StatsRecord], skipped_accounts: usize) {
    let success: usize = records.iter().map(|r| r.success_count).sum();
    let failed: usize = records.iter().map(|r| r.failure_count).sum();

    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for record in records {
        info!(
            "  {} [{}]: 成功 {}, 失败 {}",
            record.account_name,
            record.content_type,
            record.success_count,
            record.failure_count
        );
    }
    info!("✅ 成功: {}/{}", success, success + failed);
    info!("❌ 失败: {}", failed);
    if skipped_accounts > 0 {
        info!("⏭️ 跳过账号: {}", skipped_accounts);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
