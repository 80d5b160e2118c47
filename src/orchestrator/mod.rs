//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责账号循环和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量账号处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载账号表（Vec<AccountConfig>）
//! - 为每个账号构建客户端（代理按账号区分）
//! - 追加统计历史，输出全局统计信息
//!
//! ### `account_processor` - 单个账号处理器
//! - 路径、配额检查，列出待处理内容
//! - 获取 access_token
//! - 按配额遍历内容（Vec<ContentItem>）
//! - 成功的内容归档，失败的留在原处
//! - 生成单个账号的统计记录
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<AccountConfig>)
//!     ↓
//! account_processor (处理 Vec<ContentItem>)
//!     ↓
//! workflow::ArticleFlow / ImageSetFlow (处理单篇内容)
//!     ↓
//! services (能力层：转换 / 转存 / 归档 / 统计)
//!     ↓
//! clients (基础设施：DraftApi)
//! ```

pub mod account_processor;
pub mod batch_processor;

// 重新导出主要类型
pub use account_processor::{process_account, AccountOutcome};
pub use batch_processor::{App, RunSummary};
