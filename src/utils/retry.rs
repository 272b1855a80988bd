//! 有界重试
//!
//! 以固定间隔重试一个异步操作，由调用方给出可重试判定。
//! 返回结果类型而不是抛出，调用方可以对"预算耗尽"显式分支。

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

/// 固定间隔的有界重试策略
///
/// 间隔不随尝试次数增长。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（含第一次）
    pub max_attempts: u32,
    /// 两次尝试之间的固定间隔
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// 重试终止：预算耗尽，或遇到不可重试的错误
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// 实际尝试的次数
    pub attempts: u32,
    /// 最后一次的错误
    pub last_error: E,
}

/// 按策略执行操作，直到成功或重试终止
///
/// `is_retryable` 返回 `false` 的错误立即终止，不再消耗剩余预算。
pub async fn run_with_retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_attempts || !is_retryable(&error) {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: error,
                    });
                }
                warn!(
                    "第 {}/{} 次尝试失败: {}，{:?} 后重试",
                    attempt, max_attempts, error, policy.delay
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
