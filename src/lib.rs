//! # Sales Form Submit
//!
//! 一个用于自动化销售数据录入的 Rust 应用程序：登录目标应用、
//! 下载销售数据表格、逐行回放为表单提交，收尾时导出截图和 PDF
//! 产物并退出登录。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `Session` - 唯一的 page owner，提供导航 / 填写 / 点击 / 截图能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单一职责
//! - `AuthService` - 登录 / 退出登录能力（含显式登录校验）
//! - `DataDownloader` - 带有界重试的下载能力
//! - `ArtifactExporter` - 截图与 PDF 导出能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的完整处理流程
//! - `RecordCtx` - 上下文封装（第几条 / 共几条）
//! - `SalesFormFlow` - 流程编排（填写四个字段 → 提交）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 一次运行的生命周期，收尾阶段必定执行
//! - `orchestrator/batch_processor` - 逐条处理记录，失败隔离
//!
//! ## 失败分层
//!
//! - `FatalError`：中止所在阶段，直接进入收尾（导出 + 退出登录）
//! - `RecordError`：记录日志后跳过该条记录，批次继续

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, Credentials};
pub use error::{FatalError, RecordError, Result};
pub use infrastructure::Session;
pub use models::{RecordBatch, SalesRecord};
pub use orchestrator::{App, BatchStats, RunOutcome};
pub use utils::retry::RetryPolicy;
pub use workflow::{RecordCtx, SalesFormFlow};
