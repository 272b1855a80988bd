//! 销售记录数据模型

/// 一条销售记录
///
/// 对应数据表中的一行；四个字段在填表之前都是不透明字符串，
/// 除行位置外没有其他标识。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRecord {
    /// 名（表头 First Name）
    pub first_name: String,
    /// 姓（表头 Last Name）
    pub last_name: String,
    /// 销售目标（表头 Sales Target，下拉框按选项值匹配）
    pub sales_target: String,
    /// 销售业绩（表头 Sales，自由文本）
    pub sales_result: String,
}

impl SalesRecord {
    /// 日志显示用的姓名
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 一次运行处理的记录批次，顺序与数据表行顺序一致
pub type RecordBatch = Vec<SalesRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_fields() {
        let record = SalesRecord {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            sales_target: "5000".to_string(),
            sales_result: "4500".to_string(),
        };
        assert_eq!(record.full_name(), "Jane Doe");
    }
}
