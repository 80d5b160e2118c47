use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use wechat_draft_submit::logger::{self, LogSink};
use wechat_draft_submit::models::write_template;
use wechat_draft_submit::services::stats_store::FAILED_ITEMS_DELIMITER;
use wechat_draft_submit::{App, Config, StatsStore};

/// 默认配置文件，存在时自动加载
const DEFAULT_CONFIG_FILE: &str = "draft_config.toml";

#[derive(Parser)]
#[command(name = "wechat_draft_submit")]
#[command(about = "公众号批量存稿工具", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件（TOML）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 统计历史文件
    #[arg(long, global = true, env = "STATS_FILE")]
    stats_file: Option<PathBuf>,

    /// 日志写入文件而不是控制台
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 按账号表批量存稿
    Run {
        /// 账号表（.csv / .xlsx / .xls）
        #[arg(long, env = "DRAFT_ACCOUNTS")]
        accounts: PathBuf,
    },

    /// 生成账号表模板
    Template {
        #[arg(long, default_value = "账号模板.csv")]
        output: PathBuf,
    },

    /// 统计历史
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },
}

#[derive(Subcommand)]
enum StatsAction {
    /// 显示全部历史
    Show,
    /// 导出为 CSV
    Export {
        #[arg(long)]
        output: PathBuf,
    },
    /// 清空历史
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    let sink = match &cli.log_file {
        Some(path) => LogSink::File(path.clone()),
        None => LogSink::Console,
    };
    logger::init(sink, config.verbose_logging)?;

    if let Err(e) = run_command(cli.command, config).await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 配置优先级：命令行参数 > 环境变量 > 配置文件 > 默认值
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Config::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Config::from_env(),
    };

    if let Some(stats_file) = &cli.stats_file {
        config.stats_file = stats_file.display().to_string();
    }
    if cli.verbose {
        config.verbose_logging = true;
    }
    Ok(config)
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Run { accounts } => {
            let app = App::initialize(config);
            let summary = app.run(&accounts).await?;
            info!(
                "本次共处理 {} 个账号，跳过 {} 个",
                summary.records.len(),
                summary.skipped.len()
            );
        }
        Commands::Template { output } => {
            write_template(&output)?;
            info!("✓ 账号模板已生成: {}", output.display());
        }
        Commands::Stats { action } => {
            let store = StatsStore::new(&config.stats_file);
            match action {
                StatsAction::Show => show_stats(&store)?,
                StatsAction::Export { output } => {
                    let count = store.export_csv(&output)?;
                    info!("✓ 已导出 {} 条记录: {}", count, output.display());
                }
                StatsAction::Clear => store.clear()?,
            }
        }
    }
    Ok(())
}

fn show_stats(store: &StatsStore) -> Result<()> {
    let history = store.load()?;
    if history.is_empty() {
        info!("暂无统计记录: {}", store.path().display());
        return Ok(());
    }

    info!("📊 统计历史（共 {} 条）", history.len());
    for record in &history {
        info!(
            "{} | {} | {} | 成功 {} | 失败 {} | 总数 {}{}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.account_name,
            record.content_type,
            record.success_count,
            record.failure_count,
            record.total(),
            if record.failed_items.is_empty() {
                String::new()
            } else {
                format!(" | 失败: {}", record.failed_items.join(FAILED_ITEMS_DELIMITER))
            }
        );
    }
    Ok(())
}
