//! 会话驱动 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露页面操作能力：
//! 导航、填写、选择、点击、执行 JS、截图、读取区域内容。
//!
//! 整个运行期间只存在一个会话，由编排层持有，各阶段以引用借用。
//! 每个页面操作都有统一的超时上限，操作之间按配置减速。

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, timeout};

use crate::error::SessionError;

/// 默认单次页面操作超时
const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);
/// 默认操作间减速延迟
const DEFAULT_SLOWMO: Duration = Duration::from_millis(100);
/// 元素轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 下拉框选择结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// 成功选中
    Selected,
    /// 下拉框元素不存在
    ElementMissing,
    /// 下拉框存在但没有匹配的选项
    OptionMissing,
}

/// 会话驱动
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露页面操作能力
/// - 不认识 SalesRecord，不处理业务流程
pub struct Session {
    page: Page,
    op_timeout: Duration,
    slowmo: Duration,
}

impl Session {
    /// 使用默认超时与减速参数创建会话
    pub fn new(page: Page) -> Self {
        Self {
            page,
            op_timeout: DEFAULT_OP_TIMEOUT,
            slowmo: DEFAULT_SLOWMO,
        }
    }

    /// 指定超时与减速参数创建会话
    pub fn with_timings(page: Page, op_timeout: Duration, slowmo: Duration) -> Self {
        Self {
            page,
            op_timeout,
            slowmo,
        }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 导航到指定地址
    pub async fn goto(&self, url: &str) -> Result<(), SessionError> {
        self.bounded("goto", async {
            self.page.goto(url).await?;
            Ok(())
        })
        .await?
        .map_err(|source| SessionError::NavigationFailed {
            url: url.to_string(),
            source,
        })?;
        self.pace().await;
        Ok(())
    }

    /// 填写输入框：定位元素、点击聚焦、输入文本
    pub async fn fill(&self, selector: &str, value: &str) -> Result<(), SessionError> {
        let element = self
            .bounded("find_element", self.page.find_element(selector))
            .await?
            .map_err(|source| SessionError::ElementNotFound {
                selector: selector.to_string(),
                source,
            })?;

        self.bounded("fill", async {
            element.click().await?;
            element.type_str(value).await?;
            Ok(())
        })
        .await?
        .map_err(|source| SessionError::InputFailed {
            selector: selector.to_string(),
            source,
        })?;

        self.pace().await;
        Ok(())
    }

    /// 点击元素
    pub async fn click(&self, selector: &str) -> Result<(), SessionError> {
        let element = self
            .bounded("find_element", self.page.find_element(selector))
            .await?
            .map_err(|source| SessionError::ElementNotFound {
                selector: selector.to_string(),
                source,
            })?;

        self.bounded("click", async {
            element.click().await?;
            Ok(())
        })
        .await?
        .map_err(|source| SessionError::InputFailed {
            selector: selector.to_string(),
            source,
        })?;

        self.pace().await;
        Ok(())
    }

    /// 按选项值设置下拉框，并派发 change 事件
    ///
    /// 返回三态结果，由调用方决定各缺失情况对应的错误。
    pub async fn select_by_value(
        &self,
        selector: &str,
        value: &str,
    ) -> Result<SelectOutcome, SessionError> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return "missing";
                el.value = {val};
                if (el.value !== {val}) return "no-option";
                el.dispatchEvent(new Event("change", {{ bubbles: true }}));
                return "ok";
            }})()"#,
            sel = js_string(selector),
            val = js_string(value),
        );

        let outcome = self.eval_as::<String>(js).await?;
        self.pace().await;

        Ok(match outcome.as_str() {
            "ok" => SelectOutcome::Selected,
            "missing" => SelectOutcome::ElementMissing,
            _ => SelectOutcome::OptionMissing,
        })
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, SessionError> {
        let result = self
            .bounded("evaluate", self.page.evaluate(js_code.into()))
            .await?
            .map_err(|source| SessionError::ScriptFailed { source })?;

        result.into_value().map_err(|source| SessionError::ScriptResult {
            source: Box::new(source),
        })
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T, SessionError> {
        let value = self.eval(js_code).await?;
        serde_json::from_value(value).map_err(|source| SessionError::ScriptResult {
            source: Box::new(source),
        })
    }

    /// 检查元素是否存在
    pub async fn element_exists(&self, selector: &str) -> Result<bool, SessionError> {
        let js = format!("document.querySelector({}) !== null", js_string(selector));
        self.eval_as::<bool>(js).await
    }

    /// 轮询等待元素出现
    ///
    /// 在 `wait` 时间内每隔固定间隔检查一次；超过等待上限返回 `Ok(false)`。
    pub async fn wait_for_element(
        &self,
        selector: &str,
        wait: Duration,
    ) -> Result<bool, SessionError> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            if self.element_exists(selector).await? {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 读取区域的完整标记；区域不存在时返回 `Ok(None)`
    pub async fn region_html(&self, selector: &str) -> Result<Option<String>, SessionError> {
        let js = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.outerHTML : null; }})()",
            js_string(selector)
        );
        self.eval_as::<Option<String>>(js).await
    }

    /// 保存整页截图
    pub async fn save_screenshot(&self, path: &Path) -> Result<(), SessionError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        self.bounded("screenshot", self.page.save_screenshot(params, path))
            .await?
            .map_err(|source| SessionError::ScreenshotFailed { source })?;
        Ok(())
    }

    /// 给页面操作套上统一的超时上限
    async fn bounded<T, Fut>(
        &self,
        op: &'static str,
        fut: Fut,
    ) -> Result<Result<T, CdpError>, SessionError>
    where
        Fut: Future<Output = Result<T, CdpError>>,
    {
        timeout(self.op_timeout, fut)
            .await
            .map_err(|_| SessionError::Timeout {
                op,
                timeout: self.op_timeout,
            })
    }

    /// 操作间减速
    async fn pace(&self) {
        if !self.slowmo.is_zero() {
            sleep(self.slowmo).await;
        }
    }
}

/// 把字符串安全地嵌入 JS 代码（带引号与转义）
fn js_string(value: &str) -> String {
    JsonValue::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string("#sales-results"), r##""#sales-results""##);
        assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
    }
}
