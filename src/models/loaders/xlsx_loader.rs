//! 从 xlsx 工作簿加载销售记录
//!
//! 第一行是表头；按表头名定位列，其后每行映射为一条 [`SalesRecord`]，
//! 保持行顺序。工作簿句柄在本次调用内打开并关闭，成功失败都不外泄。

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use tracing::{debug, info};

use crate::error::SourceFormatError;
use crate::models::record::{RecordBatch, SalesRecord};

/// 必需的表头字段
pub const FIRST_NAME_HEADER: &str = "First Name";
pub const LAST_NAME_HEADER: &str = "Last Name";
pub const SALES_TARGET_HEADER: &str = "Sales Target";
pub const SALES_RESULT_HEADER: &str = "Sales";

/// 加载销售记录
///
/// 优先读取指定工作表，找不到时回退到第一个工作表
/// （单表导出经常被重命名）。
pub fn load_sales_records(
    path: &Path,
    worksheet: &str,
) -> Result<RecordBatch, SourceFormatError> {
    let path_display = path.display().to_string();

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|source| SourceFormatError::WorkbookOpen {
            path: path_display.clone(),
            source,
        })?;

    let range = match workbook.worksheet_range(worksheet) {
        Ok(range) => range,
        Err(_) => {
            debug!("工作表 {} 不存在，回退到第一个工作表", worksheet);
            let first = workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| SourceFormatError::MissingWorksheet {
                    path: path_display.clone(),
                })?;
            workbook
                .worksheet_range(&first)
                .map_err(|_| SourceFormatError::MissingWorksheet {
                    path: path_display.clone(),
                })?
        }
    };

    let records = parse_rows(range.rows())?;
    info!("✓ 已从 {} 读取 {} 条销售记录", path_display, records.len());
    Ok(records)
}

/// 表头在行内的列位置
struct HeaderColumns {
    first_name: usize,
    last_name: usize,
    sales_target: usize,
    sales_result: usize,
}

impl HeaderColumns {
    fn locate(header: &[Data]) -> Result<Self, SourceFormatError> {
        Ok(Self {
            first_name: find_column(header, FIRST_NAME_HEADER)?,
            last_name: find_column(header, LAST_NAME_HEADER)?,
            sales_target: find_column(header, SALES_TARGET_HEADER)?,
            sales_result: find_column(header, SALES_RESULT_HEADER)?,
        })
    }
}

/// 解析单元格行：第一行为表头，其余行按列映射为记录
pub(crate) fn parse_rows<'a, I>(mut rows: I) -> Result<RecordBatch, SourceFormatError>
where
    I: Iterator<Item = &'a [Data]>,
{
    let header = rows.next().ok_or(SourceFormatError::EmptyTable)?;
    let columns = HeaderColumns::locate(header)?;

    let mut records = Vec::new();
    for row in rows {
        // 表格尾部经常带空行
        if row.iter().all(cell_is_empty) {
            continue;
        }
        records.push(SalesRecord {
            first_name: cell_at(row, columns.first_name),
            last_name: cell_at(row, columns.last_name),
            sales_target: cell_at(row, columns.sales_target),
            sales_result: cell_at(row, columns.sales_result),
        });
    }
    Ok(records)
}

fn find_column(header: &[Data], name: &'static str) -> Result<usize, SourceFormatError> {
    header
        .iter()
        .position(|cell| {
            matches!(cell, Data::String(s) if s.trim().eq_ignore_ascii_case(name))
        })
        .ok_or(SourceFormatError::MissingHeader { field: name })
}

fn cell_at(row: &[Data], index: usize) -> String {
    row.get(index).map(cell_text).unwrap_or_default()
}

/// 单元格转字符串：整数值不带小数点尾巴
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_is_empty(cell: &Data) -> bool {
    matches!(cell, Data::Empty) || cell_text(cell).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<Data> {
        vec![
            Data::String("First Name".to_string()),
            Data::String("Last Name".to_string()),
            Data::String("Sales Target".to_string()),
            Data::String("Sales".to_string()),
        ]
    }

    fn parse(rows: &[Vec<Data>]) -> Result<RecordBatch, SourceFormatError> {
        parse_rows(rows.iter().map(Vec::as_slice))
    }

    #[test]
    fn roundtrip_single_row() {
        let rows = vec![
            header(),
            vec![
                Data::String("Jane".to_string()),
                Data::String("Doe".to_string()),
                Data::Float(200.0),
                Data::Float(150.0),
            ],
        ];

        let records = parse(&rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].first_name, "Jane");
        assert_eq!(records[0].last_name, "Doe");
        assert_eq!(records[0].sales_target, "200");
        assert_eq!(records[0].sales_result, "150");
    }

    #[test]
    fn preserves_row_order() {
        let rows = vec![
            header(),
            vec![
                Data::String("A".to_string()),
                Data::String("One".to_string()),
                Data::Float(1.0),
                Data::Float(1.0),
            ],
            vec![
                Data::String("B".to_string()),
                Data::String("Two".to_string()),
                Data::Float(2.0),
                Data::Float(2.0),
            ],
            vec![
                Data::String("C".to_string()),
                Data::String("Three".to_string()),
                Data::Float(3.0),
                Data::Float(3.0),
            ],
        ];

        let records = parse(&rows).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn missing_header_names_field() {
        let rows = vec![vec![
            Data::String("First Name".to_string()),
            Data::String("Last Name".to_string()),
            Data::String("Sales".to_string()),
        ]];

        match parse(&rows).unwrap_err() {
            SourceFormatError::MissingHeader { field } => {
                assert_eq!(field, SALES_TARGET_HEADER)
            }
            other => panic!("意外的错误类型: {other}"),
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        let rows: Vec<Vec<Data>> = Vec::new();
        assert!(matches!(
            parse(&rows).unwrap_err(),
            SourceFormatError::EmptyTable
        ));
    }

    #[test]
    fn header_only_yields_empty_batch() {
        let records = parse(&[header()]).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn skips_blank_rows_and_matches_header_loosely() {
        let rows = vec![
            vec![
                // 大小写与首尾空白不敏感
                Data::String(" first name ".to_string()),
                Data::String("LAST NAME".to_string()),
                Data::String("Sales Target".to_string()),
                Data::String("sales".to_string()),
            ],
            vec![Data::Empty, Data::Empty, Data::Empty, Data::Empty],
            vec![
                Data::String("Jane".to_string()),
                Data::String("Doe".to_string()),
                Data::Int(5000),
                Data::String("4500".to_string()),
            ],
        ];

        let records = parse(&rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sales_target, "5000");
        assert_eq!(records[0].sales_result, "4500");
    }

    #[test]
    fn short_row_fills_missing_cells_with_empty() {
        let rows = vec![
            header(),
            vec![
                Data::String("Jane".to_string()),
                Data::String("Doe".to_string()),
            ],
        ];

        let records = parse(&rows).unwrap();
        assert_eq!(records[0].sales_target, "");
        assert_eq!(records[0].sales_result, "");
    }
}
