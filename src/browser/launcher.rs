//! 启动浏览器实例

use std::path::Path;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::SessionError;

/// 启动浏览器并导航到目标地址
pub async fn launch_browser(config: &Config) -> Result<(Browser, Page), SessionError> {
    info!("🚀 启动浏览器...");
    debug!("目标 URL: {}", config.target_url);

    let mut builder = BrowserConfig::builder();
    if config.headless {
        builder = builder.new_headless_mode();
    } else {
        builder = builder.with_head();
    }
    if let Some(executable) = &config.chrome_executable {
        builder = builder.chrome_executable(Path::new(executable));
    }

    let browser_config = builder
        .args(vec![
            "--disable-gpu",             // 无头模式下禁用 GPU
            "--no-sandbox",              // 禁用沙盒，防止权限问题导致的崩溃
            "--disable-dev-shm-usage",   // 防止共享内存不足
            "--remote-debugging-port=0", // 让浏览器自动选择端口
        ])
        .build()
        .map_err(|detail| {
            error!("配置浏览器失败: {}", detail);
            SessionError::Configuration { detail }
        })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|source| {
        error!("启动浏览器失败: {}", source);
        SessionError::LaunchFailed { source }
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    let page = browser
        .new_page(&config.target_url)
        .await
        .map_err(|source| {
            error!("创建页面失败: {}", source);
            SessionError::PageCreationFailed { source }
        })?;

    info!("✅ 浏览器已导航到: {}", config.target_url);

    Ok((browser, page))
}
