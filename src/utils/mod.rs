pub mod logging;
pub mod retry;

pub use retry::{run_with_retry, RetryExhausted, RetryPolicy};
