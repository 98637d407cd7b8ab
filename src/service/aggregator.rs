use crate::error::{PipelineError, Result};
use crate::models::{
    InvoiceField, InvoiceRecord, LineItem, PRODUCT_NAME_COLUMN, PRODUCT_TOTAL_COLUMN,
    QUANTITY_COLUMN, UNIT_PRICE_COLUMN,
};
use crate::store::TabularRow;
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use std::str::FromStr;

/// 按发票号聚合表格行
///
/// 顺序保证: 输出顺序为每个发票号首次出现的顺序 (不排序)。
/// 同一发票号的标量字段以最后一行为准, 不校验跨行一致性。
#[derive(Debug, Default)]
pub struct RecordAggregator {
    groups: IndexMap<String, InvoiceRecord>,
}

impl RecordAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取发票号对应的记录, 不存在则在末尾新建
    pub fn get_or_create(&mut self, invoice_number: &str) -> &mut InvoiceRecord {
        self.groups
            .entry(invoice_number.to_string())
            .or_insert_with(|| InvoiceRecord::new(invoice_number))
    }

    /// 合并一行; 先完整解析再写入, 出错时聚合状态不变
    pub fn push_row(&mut self, index: usize, row: &TabularRow) -> Result<()> {
        let invoice_number = cell(row, index, InvoiceField::InvoiceNumber.column())?;

        let mut scalars = Vec::with_capacity(InvoiceField::ALL.len());
        for field in InvoiceField::ALL {
            scalars.push((field, cell(row, index, field.column())?));
        }
        let item = parse_line_item(index, row)?;

        let record = self.get_or_create(invoice_number);
        for (field, value) in scalars {
            record.set(field, value);
        }
        record.add_item(item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn finish(self) -> Vec<InvoiceRecord> {
        self.groups.into_values().collect()
    }
}

/// 聚合全部行, 任一行出错即中止 (不产生部分结果)
pub fn aggregate_rows<'a, I>(rows: I) -> Result<Vec<InvoiceRecord>>
where
    I: IntoIterator<Item = &'a TabularRow>,
{
    let mut aggregator = RecordAggregator::new();
    let mut row_count = 0usize;
    for (index, row) in rows.into_iter().enumerate() {
        aggregator.push_row(index, row)?;
        row_count += 1;
    }
    tracing::info!(
        "Aggregated {} rows into {} invoices",
        row_count,
        aggregator.len()
    );
    Ok(aggregator.finish())
}

fn cell<'r>(row: &'r TabularRow, index: usize, column: &str) -> Result<&'r str> {
    row.get(column)
        .map(String::as_str)
        .ok_or_else(|| PipelineError::Schema {
            column: column.to_string(),
            row: Some(index),
        })
}

fn parse_line_item(index: usize, row: &TabularRow) -> Result<LineItem> {
    let product_name = cell(row, index, PRODUCT_NAME_COLUMN)?;

    let raw_quantity = cell(row, index, QUANTITY_COLUMN)?;
    let quantity = raw_quantity
        .trim()
        .parse::<u32>()
        .map_err(|_| malformed(index, QUANTITY_COLUMN, raw_quantity))?;

    let raw_unit_price = cell(row, index, UNIT_PRICE_COLUMN)?;
    let unit_price = parse_decimal(index, UNIT_PRICE_COLUMN, raw_unit_price)?;

    let raw_total = cell(row, index, PRODUCT_TOTAL_COLUMN)?;
    let total = parse_decimal(index, PRODUCT_TOTAL_COLUMN, raw_total)?;

    Ok(LineItem {
        product_name: product_name.to_string(),
        quantity,
        unit_price,
        total,
    })
}

fn parse_decimal(index: usize, field: &'static str, raw: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(raw.trim()).map_err(|_| malformed(index, field, raw))
}

fn malformed(row: usize, field: &'static str, value: &str) -> PipelineError {
    PipelineError::MalformedRow {
        row,
        field,
        value: value.to_string(),
    }
}
