//! 销售表单流程 - 流程层
//!
//! 定义"一条记录"的完整提交流程：按源表列顺序填写四个字段，
//! 然后点击提交。任何失败都是单条记录层级的 [`RecordError`]，
//! 并指明第一个出问题的字段。

use tracing::info;

use crate::error::{FormError, RecordError};
use crate::infrastructure::{SelectOutcome, Session};
use crate::models::loaders::xlsx_loader::{
    FIRST_NAME_HEADER, LAST_NAME_HEADER, SALES_RESULT_HEADER, SALES_TARGET_HEADER,
};
use crate::models::SalesRecord;
use crate::workflow::record_ctx::RecordCtx;

/// 销售表单选择器
const FIRST_NAME_INPUT: &str = "#firstname";
const LAST_NAME_INPUT: &str = "#lastname";
const SALES_TARGET_SELECT: &str = "#salestarget";
const SALES_RESULT_INPUT: &str = "#salesresult";
const SUBMIT_BUTTON: &str = "input[type='submit']";

/// 销售表单流程
///
/// - 编排单条记录的填写与提交
/// - 不持有任何资源（page）
/// - 不出现 Vec<SalesRecord>
pub struct SalesFormFlow;

impl SalesFormFlow {
    /// 创建新的表单流程
    pub fn new() -> Self {
        Self
    }

    /// 填写并提交一条销售记录
    pub async fn run(
        &self,
        session: &Session,
        record: &SalesRecord,
        ctx: &RecordCtx,
    ) -> Result<(), RecordError> {
        info!("{} 正在填写销售表单: {}", ctx, record.full_name());

        self.fill(session, FIRST_NAME_HEADER, FIRST_NAME_INPUT, &record.first_name)
            .await?;
        self.fill(session, LAST_NAME_HEADER, LAST_NAME_INPUT, &record.last_name)
            .await?;
        self.select_target(session, &record.sales_target).await?;
        self.fill(
            session,
            SALES_RESULT_HEADER,
            SALES_RESULT_INPUT,
            &record.sales_result,
        )
        .await?;

        session
            .click(SUBMIT_BUTTON)
            .await
            .map_err(|source| FormError::Submit { source })?;

        info!("{} ✓ 表单已提交", ctx);
        Ok(())
    }

    async fn fill(
        &self,
        session: &Session,
        field: &'static str,
        selector: &str,
        value: &str,
    ) -> Result<(), FormError> {
        session
            .fill(selector, value)
            .await
            .map_err(|source| FormError::Field { field, source })
    }

    /// 销售目标是下拉框，按选项值匹配
    async fn select_target(&self, session: &Session, value: &str) -> Result<(), FormError> {
        let outcome = session
            .select_by_value(SALES_TARGET_SELECT, value)
            .await
            .map_err(|source| FormError::Field {
                field: SALES_TARGET_HEADER,
                source,
            })?;

        match outcome {
            SelectOutcome::Selected => Ok(()),
            SelectOutcome::ElementMissing => Err(FormError::FieldMissing {
                field: SALES_TARGET_HEADER,
            }),
            SelectOutcome::OptionMissing => Err(FormError::OptionNotFound {
                field: SALES_TARGET_HEADER,
                value: value.to_string(),
            }),
        }
    }
}

impl Default for SalesFormFlow {
    fn default() -> Self {
        Self::new()
    }
}
