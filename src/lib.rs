//! # WeChat Draft Submit
//!
//! 公众号批量存稿工具：读取账号表，把本地图文或贴图内容转换后提交为草稿
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 平台接口，只暴露能力
//! - `DraftApi` - token / 图片下载 / 素材上传 / 新建草稿
//! - `WeChatClient` - 基于 reqwest 的实现，代理按账号配置
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单篇内容
//! - `html_transform` - CSS 内联、标签清理、图片地址改写
//! - `ImageRehoster` / `select_cover` - 图片转存与封面选择
//! - `Archiver` / `StatsStore` - 归档与统计历史
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一篇内容"的完整处理流程
//! - `ItemCtx` - 上下文封装（账号 + 序号）
//! - `ArticleFlow` / `ImageSetFlow` - 流程编排（转换 → 上传 → 提交）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 账号循环，管理统计落盘
//! - `orchestrator/account_processor` - 单个账号处理器，遍历内容列表
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{DraftApi, WeChatClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use logger::LogSink;
pub use models::{AccountConfig, ContentItem, ContentType, StatsRecord};
pub use orchestrator::{process_account, AccountOutcome, App, RunSummary};
pub use services::{Capabilities, StatsStore};
pub use workflow::{ItemCtx, ProcessResult};
