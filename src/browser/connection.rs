//! 连接到已运行的浏览器

use std::time::Duration;

use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::SessionError;

/// 通过调试端口连接到浏览器并打开目标页面
pub async fn connect_to_browser(port: u16, target_url: &str) -> Result<(Browser, Page), SessionError> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|source| {
        error!("连接浏览器失败: {}", source);
        SessionError::ConnectionFailed { port, source }
    })?;
    debug!("浏览器连接成功");

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

    let page = browser.new_page("about:blank").await.map_err(|source| {
        error!("创建页面失败: {}", source);
        SessionError::PageCreationFailed { source }
    })?;

    page.goto(target_url).await.map_err(|source| {
        error!("导航到 {} 失败: {}", target_url, source);
        SessionError::NavigationFailed {
            url: target_url.to_string(),
            source,
        }
    })?;
    info!("已导航到: {}", target_url);

    Ok((browser, page))
}
