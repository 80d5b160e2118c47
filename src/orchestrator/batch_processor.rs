//! 批量账号处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责账号表的加载和逐个账号的调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：检测可选能力、准备统计存储
//! 2. **账号加载**：读取账号表（`Vec<AccountConfig>`）
//! 3. **顺序处理**：逐个账号构建客户端并委托 account_processor
//! 4. **统计落盘**：每个完成的账号追加一条历史记录
//! 5. **全局统计**：汇总输出本次运行结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单篇内容的细节
//! - **单线程**：账号之间严格顺序执行，不并发
//! - **错误隔离**：任何账号的失败都不会终止整次运行

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;
use tracing::{error, info, warn};

use crate::clients::{DraftApi, WeChatClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::logger::{self, LogSink};
use crate::models::{load_accounts, AccountConfig, StatsRecord};
use crate::orchestrator::account_processor::{process_account, AccountOutcome};
use crate::services::{Capabilities, StatsStore};
use crate::utils::logging::{
    log_account_complete, log_account_start, log_accounts_loaded, log_startup, print_final_stats,
};

/// 本次运行的汇总
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    /// 完成处理的账号记录（顺序同账号表）
    pub records: Vec<StatsRecord>,
    /// 被跳过的账号：(账号名称, 原因)
    pub skipped: Vec<(String, String)>,
}

impl RunSummary {
    pub fn total_success(&self) -> usize {
        self.records.iter().map(|r| r.success_count).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.records.iter().map(|r| r.failure_count).sum()
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    capabilities: Capabilities,
    stats_store: StatsStore,
}

impl App {
    /// 初始化应用，可选能力在这里检测一次
    pub fn initialize(config: Config) -> Self {
        Self::with_capabilities(config, Capabilities::detect())
    }

    pub fn with_capabilities(config: Config, capabilities: Capabilities) -> Self {
        log_startup(&config, capabilities);
        let stats_store = StatsStore::new(&config.stats_file);
        Self {
            config,
            capabilities,
            stats_store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats_store(&self) -> &StatsStore {
        &self.stats_store
    }

    /// 运行应用主逻辑
    ///
    /// 账号表缺列时整次运行中止，其余错误只影响对应账号
    pub async fn run(&self, accounts_path: &Path) -> Result<RunSummary> {
        info!("\n📁 正在读取账号表: {}", accounts_path.display());
        let accounts = load_accounts(accounts_path)
            .with_context(|| format!("无法加载账号表: {}", accounts_path.display()))?;

        if accounts.is_empty() {
            warn!("⚠️ 账号表中没有可用账号，程序结束");
            return Ok(RunSummary::default());
        }

        self.run_accounts(&accounts, |account| {
            let client = WeChatClient::new(&self.config, account.proxy.as_ref())?;
            Ok(Box::new(client) as Box<dyn DraftApi>)
        })
        .await
    }

    /// 逐个处理账号
    ///
    /// # 参数
    /// - `accounts`: 账号列表
    /// - `make_api`: 为每个账号构建平台接口（代理按账号区分）
    pub async fn run_accounts<F>(&self, accounts: &[AccountConfig], make_api: F) -> Result<RunSummary>
    where
        F: Fn(&AccountConfig) -> AppResult<Box<dyn DraftApi>>,
    {
        log_accounts_loaded(accounts.len());
        let mut summary = RunSummary::default();

        for (index, account) in accounts.iter().enumerate() {
            log_account_start(index + 1, accounts.len(), account);

            let api = match make_api(account) {
                Ok(api) => api,
                Err(e) => {
                    error!("[账号 {}] ❌ 创建客户端失败: {}", account.name, e);
                    summary
                        .skipped
                        .push((account.name.clone(), format!("创建客户端失败: {}", e)));
                    continue;
                }
            };

            match process_account(api.as_ref(), account, &self.config, self.capabilities).await {
                AccountOutcome::Completed(record) => {
                    log_account_complete(&record);
                    if let Err(e) = self.stats_store.append(record.clone()) {
                        error!("[账号 {}] ⚠️ 统计保存失败: {}", account.name, e);
                    }
                    summary.records.push(record);
                }
                AccountOutcome::Skipped { reason } => {
                    summary.skipped.push((account.name.clone(), reason));
                }
            }
        }

        print_final_stats(&summary.records, summary.skipped.len());
        Ok(summary)
    }

    /// 在后台任务中运行，日志只发往指定输出端
    ///
    /// 供嵌入式前端使用：每一行日志都会送到 `sink`，不影响全局订阅者
    pub fn spawn_with_sink(
        self: Arc<Self>,
        accounts_path: PathBuf,
        sink: LogSink,
    ) -> Result<JoinHandle<Result<RunSummary>>> {
        let subscriber = logger::subscriber(sink, self.config.verbose_logging)
            .context("无法创建日志输出端")?;

        let handle = tokio::spawn(
            async move { self.run(&accounts_path).await }.with_subscriber(subscriber),
        );
        Ok(handle)
    }
}
