//! 基础设施层
//!
//! 持有稀缺资源（Page），只暴露能力，不认识业务类型。

pub mod session;

pub use session::{SelectOutcome, Session};
