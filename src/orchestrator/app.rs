//! 运行编排 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次运行的完整生命周期：
//!
//! 1. **初始化**：凭据校验 → 输出目录 → 接入浏览器 → 建立会话
//! 2. **处理阶段**：登录 → 下载数据 → 解析记录 → 逐条提交
//! 3. **收尾阶段**：导出产物 + 退出登录，初始化成功后必定执行一次
//!
//! ## 失败语义
//!
//! - 初始化失败：整个运行中止，后续什么都不执行
//! - 处理阶段的致命错误：记录日志后仍进入收尾阶段
//! - 收尾阶段自身的失败：只记录日志，不会掩盖处理结果
//!   （终态在进入收尾之前已经定下）

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::{ConfigError, FatalError};
use crate::infrastructure::Session;
use crate::models;
use crate::orchestrator::batch_processor::{self, BatchStats};
use crate::services::{ArtifactExporter, AuthService, DataDownloader};
use crate::utils::logging;
use crate::utils::retry::RetryPolicy;
use crate::workflow::SalesFormFlow;

/// 一次运行的终态
///
/// 由处理阶段的结果推导，只用于日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 全部记录提交成功
    Succeeded { total: usize },
    /// 部分记录失败
    PartiallySucceeded { failed: usize, total: usize },
    /// 处理阶段在批量提交开始前中止
    Aborted,
}

impl RunOutcome {
    pub fn from_stats(stats: &BatchStats) -> Self {
        if stats.failed == 0 {
            RunOutcome::Succeeded { total: stats.total }
        } else {
            RunOutcome::PartiallySucceeded {
                failed: stats.failed,
                total: stats.total,
            }
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Succeeded { total } => {
                write!(f, "✅ 运行成功: 共提交 {} 条记录", total)
            }
            RunOutcome::PartiallySucceeded { failed, total } => {
                write!(f, "⚠️ 部分成功: {}/{} 条记录失败", failed, total)
            }
            RunOutcome::Aborted => write!(f, "❌ 运行中止: 未进入批量提交"),
        }
    }
}

/// 应用主结构
///
/// 唯一持有 Browser 与 Session 的模块；各阶段以引用借用会话。
pub struct App {
    config: Config,
    auth: AuthService,
    downloader: DataDownloader,
    exporter: ArtifactExporter,
    browser: Browser,
    session: Session,
}

impl App {
    /// 初始化应用
    ///
    /// 凭据校验发生在任何网络和页面操作之前。
    pub async fn initialize(config: Config) -> Result<Self, FatalError> {
        logging::log_startup(&config);

        // 凭据检查先于一切网络与页面操作
        let credentials = config.credentials()?;

        // 确保输出目录存在
        std::fs::create_dir_all(&config.output_dir).map_err(|source| ConfigError::OutputDir {
            path: config.output_dir.clone(),
            source,
        })?;

        // 接入浏览器
        let (browser, page) = match config.browser_debug_port {
            Some(port) => browser::connect_to_browser(port, &config.target_url).await?,
            None => browser::launch_browser(&config).await?,
        };

        let session = Session::with_timings(
            page,
            Duration::from_secs(config.op_timeout_secs),
            Duration::from_millis(config.slowmo_ms),
        );

        let auth = AuthService::new(credentials, Duration::from_secs(config.login_wait_secs));
        let downloader = DataDownloader::new(RetryPolicy::fixed(
            config.fetch_max_attempts,
            Duration::from_secs(config.fetch_retry_delay_secs),
        ));
        let exporter = ArtifactExporter::new(&config);

        info!("✓ 初始化完成");

        Ok(Self {
            config,
            auth,
            downloader,
            exporter,
            browser,
            session,
        })
    }

    /// 运行主流程
    pub async fn run(&self) -> Result<()> {
        // 处理阶段：致命错误记录日志后仍进入收尾
        let phase_result = self.run_processing_phase().await;

        // 终态在收尾之前定下，收尾阶段无法改写
        let outcome = match &phase_result {
            Ok(stats) => RunOutcome::from_stats(stats),
            Err(e) => {
                error!("处理阶段失败: {}", e);
                RunOutcome::Aborted
            }
        };

        // 收尾阶段：始终执行
        self.finalize().await;

        // 最终横幅
        match &phase_result {
            Ok(stats) => logging::print_final_stats(
                stats.success,
                stats.failed,
                stats.total,
                &self.config.log_file,
            ),
            Err(_) => logging::log_run_aborted(&self.config.log_file),
        }
        info!("{}", outcome);

        Ok(())
    }

    /// 处理阶段：登录 → 下载 → 解析 → 逐条提交
    async fn run_processing_phase(&self) -> Result<BatchStats, FatalError> {
        self.auth.login(&self.session).await?;

        let data_file = Path::new(&self.config.sales_data_file);
        self.downloader
            .download(&self.config.sales_data_url, data_file, true)
            .await?;

        let batch = models::load_sales_records(data_file, &self.config.worksheet)?;
        if batch.is_empty() {
            warn!("⚠️ 数据文件中没有销售记录");
        }
        logging::log_records_loaded(batch.len());

        let flow = SalesFormFlow::new();
        let session = &self.session;
        let stats = batch_processor::process_batch(batch, |record, ctx| {
            let flow = &flow;
            async move { flow.run(session, &record, &ctx).await }
        })
        .await;

        Ok(stats)
    }

    /// 收尾阶段：导出产物并退出登录
    ///
    /// 两步各自的失败都只记录日志。
    async fn finalize(&self) {
        let _ = self.exporter.export(&self.browser, &self.session).await;

        if let Err(e) = self.auth.logout(&self.session).await {
            error!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_from_clean_stats_is_success() {
        let stats = BatchStats {
            success: 3,
            failed: 0,
            total: 3,
        };
        assert_eq!(
            RunOutcome::from_stats(&stats),
            RunOutcome::Succeeded { total: 3 }
        );
    }

    #[test]
    fn outcome_counts_partial_failures() {
        let stats = BatchStats {
            success: 2,
            failed: 1,
            total: 3,
        };
        assert_eq!(
            RunOutcome::from_stats(&stats),
            RunOutcome::PartiallySucceeded {
                failed: 1,
                total: 3
            }
        );
    }
}
