//! 日志工具模块
//!
//! 初始化 tracing 订阅器（控制台 + 每次运行覆盖的日志文件），
//! 并提供统一的横幅和统计输出辅助函数。

use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// 同时输出到控制台和日志文件；日志文件每次运行重新创建，
/// 作为一次运行的完整审计记录。
pub fn init(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("无法创建日志文件: {}", config.log_file))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if config.verbose_logging {
            "debug"
        } else {
            "info"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();

    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 销售数据录入机器人");
    info!(
        "开始时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 目标应用: {}", config.target_url);
    info!("📁 输出目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

/// 记录数据加载信息
pub fn log_records_loaded(total: usize) {
    info!("✓ 共加载 {} 条销售记录", total);
    info!("📋 将按表格行顺序逐条提交\n");
}

/// 打印最终统计信息
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file);
}

/// 打印运行中止信息
pub fn log_run_aborted(log_file: &str) {
    error!("\n{}", "=".repeat(60));
    error!("❌ 处理阶段中止，未能进入批量提交");
    error!("{}", "=".repeat(60));
    error!("\n日志已保存至: {}", log_file);
}
