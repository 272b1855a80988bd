//! 流程层
//!
//! 定义"一条记录"的完整处理流程，只依赖业务能力和会话能力。

pub mod record_ctx;
pub mod sales_form;

pub use record_ctx::RecordCtx;
pub use sales_form::SalesFormFlow;
