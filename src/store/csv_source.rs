use crate::error::{PipelineError, Result};
use crate::models::required_columns;
use indexmap::IndexMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 一行表格数据: 列名 -> 原始字符串值 (保持表头顺序)
pub type TabularRow = IndexMap<String, String>;

/// 从文件读取全部数据行
pub fn read_rows(path: &Path) -> Result<Vec<TabularRow>> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    read_rows_from(file, path)
}

/// 从任意 reader 读取数据行, `origin` 仅用于错误信息
///
/// 表头缺少必需列时在读取任何数据行之前返回 `Schema` 错误。
/// 短行不报错, 缺失的单元格留给聚合阶段按行报告。
pub fn read_rows_from<R: Read>(reader: R, origin: &Path) -> Result<Vec<TabularRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::Csv {
            path: origin.to_path_buf(),
            source: e,
        })?
        .clone();

    if let Some(missing) = required_columns().find(|col| !headers.iter().any(|h| h == *col)) {
        return Err(PipelineError::Schema {
            column: missing.to_string(),
            row: None,
        });
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| PipelineError::Csv {
            path: origin.to_path_buf(),
            source: e,
        })?;
        let row: TabularRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }

    tracing::debug!("Read {} rows from {}", rows.len(), origin.display());
    Ok(rows)
}
