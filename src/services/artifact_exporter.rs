//! 产物导出 - 业务能力层
//!
//! 运行收尾时产出两个产物：整页截图和结果区域渲染成的 PDF。
//! 导出是尽力而为：任一子步骤失败只记录日志，不改变批次结果，
//! 也不向编排层传播。

use std::path::{Path, PathBuf};

use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{ExportError, SessionError};
use crate::infrastructure::Session;

/// 结果区域选择器
const RESULTS_REGION: &str = "#sales-results";

/// 两个产物的落盘位置
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub screenshot: PathBuf,
    pub document: PathBuf,
}

/// 产物导出服务
pub struct ArtifactExporter {
    output_dir: PathBuf,
    screenshot_file: String,
    document_file: String,
}

impl ArtifactExporter {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: PathBuf::from(&config.output_dir),
            screenshot_file: config.screenshot_file.clone(),
            document_file: config.document_file.clone(),
        }
    }

    /// 尽力导出两个产物
    ///
    /// 目标目录在初始化阶段已保证存在；两个文件每次运行都会覆盖。
    pub async fn export(&self, browser: &Browser, session: &Session) -> ArtifactPaths {
        info!("📦 正在导出运行产物...");

        let paths = ArtifactPaths {
            screenshot: self.output_dir.join(&self.screenshot_file),
            document: self.output_dir.join(&self.document_file),
        };

        match self.capture_screenshot(session, &paths.screenshot).await {
            Ok(()) => info!("📸 截图已保存: {}", paths.screenshot.display()),
            Err(e) => error!("截图导出失败: {}", e),
        }

        match self
            .render_results_document(browser, session, &paths.document)
            .await
        {
            Ok(()) => info!("📄 PDF 已保存: {}", paths.document.display()),
            Err(e) => error!("PDF 导出失败: {}", e),
        }

        paths
    }

    async fn capture_screenshot(
        &self,
        session: &Session,
        path: &Path,
    ) -> Result<(), ExportError> {
        session
            .save_screenshot(path)
            .await
            .map_err(|source| ExportError::Screenshot { source })
    }

    async fn render_results_document(
        &self,
        browser: &Browser,
        session: &Session,
        path: &Path,
    ) -> Result<(), ExportError> {
        let html = session
            .region_html(RESULTS_REGION)
            .await
            .map_err(|source| ExportError::Region { source })?
            .ok_or_else(|| ExportError::RegionNotFound {
                selector: RESULTS_REGION.to_string(),
            })?;

        render_pdf(browser, &wrap_document(&html), path)
            .await
            .map_err(|source| ExportError::PdfRender { source })
    }
}

/// 把区域标记包装成独立的 HTML 文档
fn wrap_document(region_html: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
        region_html
    )
}

/// 在临时空白页上渲染 PDF
///
/// 不触碰会话页面，渲染后退出登录仍然可用。渲染页用完即关。
async fn render_pdf(browser: &Browser, html: &str, path: &Path) -> Result<(), SessionError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|source| SessionError::PageCreationFailed { source })?;

    let result = async {
        page.set_content(html)
            .await
            .map_err(|source| SessionError::ContentFailed { source })?;
        page.save_pdf(PrintToPdfParams::default(), path)
            .await
            .map_err(|source| SessionError::PdfFailed { source })?;
        Ok::<(), SessionError>(())
    }
    .await;

    if let Err(e) = page.close().await {
        warn!("关闭渲染页面失败: {}", e);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_document_embeds_region_markup() {
        let document = wrap_document("<div id=\"sales-results\"><p>ok</p></div>");
        assert!(document.starts_with("<!DOCTYPE html>"));
        assert!(document.contains("<div id=\"sales-results\"><p>ok</p></div>"));
    }
}
