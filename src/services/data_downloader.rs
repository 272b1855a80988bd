//! 数据文件下载 - 业务能力层
//!
//! 只负责"把一个 URL 下载到本地文件"的能力：固定间隔的有界重试，
//! 临时文件 + 原子重命名落盘。失败的尝试不会在目标路径留下半截文件。

use std::future::Future;
use std::path::{Path, PathBuf};

use reqwest::Client;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::utils::retry::{run_with_retry, RetryPolicy};

/// 单次下载尝试的失败
#[derive(Debug, Error)]
enum AttemptError {
    /// 连接失败、超时等网络层错误
    #[error("请求失败: {0}")]
    Request(#[from] reqwest::Error),

    /// 服务端返回非 2xx 状态
    #[error("HTTP 状态异常: {0}")]
    Status(reqwest::StatusCode),
}

/// 数据文件下载服务
pub struct DataDownloader {
    client: Client,
    policy: RetryPolicy,
}

impl DataDownloader {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            policy,
        }
    }

    /// 下载数据文件
    ///
    /// `overwrite = false` 且目标已存在时直接复用现有文件，不发起网络请求。
    /// 连接错误、超时、非 2xx 状态都视为瞬时故障进入重试；
    /// 预算耗尽返回 [`FetchError::Exhausted`]，附带 URL 和尝试次数。
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        overwrite: bool,
    ) -> Result<(), FetchError> {
        download_with(&self.policy, url, dest, overwrite, || self.attempt(url)).await
    }

    async fn attempt(&self, url: &str) -> Result<Vec<u8>, AttemptError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }
        let bytes = response.bytes().await?;
        debug!("收到 {} 字节", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// 下载主流程，尝试逻辑由闭包注入
///
/// 每次尝试把完整内容读进内存，只有成功的尝试才会写盘。
pub(crate) async fn download_with<F, Fut, E>(
    policy: &RetryPolicy,
    url: &str,
    dest: &Path,
    overwrite: bool,
    attempt: F,
) -> Result<(), FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<u8>, E>>,
    E: std::fmt::Display,
{
    if !overwrite && dest.exists() {
        info!("目标文件已存在，跳过下载: {}", dest.display());
        return Ok(());
    }

    info!("⬇️ 正在下载: {}", url);

    let bytes = run_with_retry(policy, |_: &E| true, attempt)
        .await
        .map_err(|exhausted| FetchError::Exhausted {
            url: url.to_string(),
            attempts: exhausted.attempts,
            detail: exhausted.last_error.to_string(),
        })?;

    write_atomic(dest, &bytes)
        .await
        .map_err(|source| FetchError::Destination {
            path: dest.display().to_string(),
            source,
        })?;

    info!("✓ 下载完成: {} ({} 字节)", dest.display(), bytes.len());
    Ok(())
}

/// 临时文件 + 重命名的原子写入
async fn write_atomic(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = part_path(dest);
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, dest).await?;
    Ok(())
}

fn part_path(dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    dest.with_file_name(format!(".{}.part", file_name))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn quick_policy() -> RetryPolicy {
        RetryPolicy::fixed(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn third_attempt_succeeds_and_writes_exact_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("SalesData.xlsx");
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = download_with(&quick_policy(), "http://example/sales", &dest, true, || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("连接被重置")
                } else {
                    Ok(b"good bytes".to_vec())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"good bytes");
        // 临时文件不残留
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn exhausted_retries_create_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("SalesData.xlsx");

        let result = download_with(&quick_policy(), "http://example/sales", &dest, true, || async {
            Err::<Vec<u8>, _>("服务不可用")
        })
        .await;

        match result.unwrap_err() {
            FetchError::Exhausted { url, attempts, .. } => {
                assert_eq!(url, "http://example/sales");
                assert_eq!(attempts, 3);
            }
            other => panic!("意外的错误类型: {other}"),
        }
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn exhausted_retries_leave_existing_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("SalesData.xlsx");
        std::fs::write(&dest, b"previous run").unwrap();

        let result = download_with(&quick_policy(), "http://example/sales", &dest, true, || async {
            Err::<Vec<u8>, _>("服务不可用")
        })
        .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous run");
    }

    #[tokio::test]
    async fn existing_file_skips_download_when_not_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("SalesData.xlsx");
        std::fs::write(&dest, b"previous run").unwrap();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = download_with(&quick_policy(), "http://example/sales", &dest, false, || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, &str>(b"new bytes".to_vec()) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous run");
    }
}
