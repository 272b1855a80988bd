//! 批量记录处理器 - 编排层
//!
//! ## 职责
//!
//! 按源表行顺序逐条处理销售记录，是整个流水线的核心循环。
//!
//! ## 失败隔离
//!
//! 单条记录的失败（[`RecordError`]）在循环内就地捕获：连同该条记录的
//! 字段值一起记入日志，然后继续处理下一条。批次永远不会因为某一条
//! 记录失败而中止，最终一定到达完成态。
//!
//! 批次级别的致命问题（未登录、数据文件读不出来）不会进入本模块，
//! 由处理阶段以 `FatalError` 在批量提交开始前直接上抛。

use std::future::Future;

use tracing::{error, info};

use crate::error::RecordError;
use crate::models::{RecordBatch, SalesRecord};
use crate::workflow::RecordCtx;

/// 批次处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

/// 逐条处理批次内的所有记录
///
/// `submit` 是单条记录的提交操作；批次被完整消费一次，
/// 每条记录恰好尝试一次。
pub async fn process_batch<F, Fut>(batch: RecordBatch, mut submit: F) -> BatchStats
where
    F: FnMut(SalesRecord, RecordCtx) -> Fut,
    Fut: Future<Output = Result<(), RecordError>>,
{
    let total = batch.len();
    let mut stats = BatchStats {
        total,
        ..Default::default()
    };

    for (index, record) in batch.into_iter().enumerate() {
        let ctx = RecordCtx::new(index + 1, total);
        info!("{} 开始处理: {}", ctx, record.full_name());

        match submit(record.clone(), ctx).await {
            Ok(()) => {
                stats.success += 1;
                info!("{} ✓ 提交成功", ctx);
            }
            Err(e) => {
                stats.failed += 1;
                error!("{} ❌ 提交失败: {} (记录内容: {:?})", ctx, e, record);
            }
        }
    }

    info!(
        "批次处理完成: 成功 {}, 失败 {}, 总计 {}",
        stats.success, stats.failed, stats.total
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;

    fn record(first_name: &str) -> SalesRecord {
        SalesRecord {
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            sales_target: "5000".to_string(),
            sales_result: "4500".to_string(),
        }
    }

    fn form_error() -> RecordError {
        RecordError::Form(FormError::FieldMissing {
            field: "Sales Target",
        })
    }

    #[tokio::test]
    async fn attempts_every_record_in_order() {
        let batch = vec![record("A"), record("B"), record("C")];
        let mut attempted = Vec::new();

        let stats = process_batch(batch, |record, _ctx| {
            attempted.push(record.first_name.clone());
            async { Ok(()) }
        })
        .await;

        assert_eq!(attempted, vec!["A", "B", "C"]);
        assert_eq!(
            stats,
            BatchStats {
                success: 3,
                failed: 0,
                total: 3
            }
        );
    }

    #[tokio::test]
    async fn failing_record_is_skipped_and_batch_continues() {
        let batch = vec![record("A"), record("B"), record("C")];
        let mut attempted = Vec::new();

        let stats = process_batch(batch, |record, ctx| {
            attempted.push(record.first_name.clone());
            let failing = ctx.row_index == 2;
            async move {
                if failing {
                    Err(form_error())
                } else {
                    Ok(())
                }
            }
        })
        .await;

        // 第 2 条失败不影响第 3 条
        assert_eq!(attempted, vec!["A", "B", "C"]);
        assert_eq!(
            stats,
            BatchStats {
                success: 2,
                failed: 1,
                total: 3
            }
        );
    }

    #[tokio::test]
    async fn all_failures_never_abort_the_batch() {
        let batch = vec![record("A"), record("B"), record("C")];
        let mut attempts = 0usize;

        let stats = process_batch(batch, |_record, _ctx| {
            attempts += 1;
            async { Err(form_error()) }
        })
        .await;

        assert_eq!(attempts, 3);
        assert_eq!(
            stats,
            BatchStats {
                success: 0,
                failed: 3,
                total: 3
            }
        );
    }

    #[tokio::test]
    async fn empty_batch_completes_with_zero_stats() {
        let stats = process_batch(Vec::new(), |_record, _ctx| async { Ok(()) }).await;
        assert_eq!(stats, BatchStats::default());
    }
}
