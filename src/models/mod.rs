pub mod loaders;
pub mod record;

pub use loaders::load_sales_records;
pub use record::{RecordBatch, SalesRecord};
