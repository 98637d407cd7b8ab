use crate::models::{InvoiceField, InvoiceRecord, TrainingPair, SUMMARY_PLACEHOLDER};

/// 摘要中产品部分的写法
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryStyle {
    /// 仅列出产品名, 逗号分隔
    #[default]
    Compact,
    /// 每个产品附带数量、单价和小计
    Detailed,
}

/// 摘要字段顺序: 产品列表插在发票日期之后
const LEADING_FIELDS: [InvoiceField; 6] = [
    InvoiceField::Name,
    InvoiceField::Address,
    InvoiceField::Phone,
    InvoiceField::Email,
    InvoiceField::InvoiceNumber,
    InvoiceField::InvoiceDate,
];
const TRAILING_FIELDS: [InvoiceField; 3] = [
    InvoiceField::TotalAmount,
    InvoiceField::PaymentDue,
    InvoiceField::Comments,
];

pub fn summarize(record: &InvoiceRecord, style: SummaryStyle) -> String {
    let mut parts: Vec<String> = LEADING_FIELDS
        .iter()
        .map(|&f| format!("{}: {}", f.label(), record.value_or(f, SUMMARY_PLACEHOLDER)))
        .collect();

    parts.push(format!("Produkte: {}", products_text(record, style)));

    parts.extend(
        TRAILING_FIELDS
            .iter()
            .map(|&f| format!("{}: {}", f.label(), record.value_or(f, SUMMARY_PLACEHOLDER))),
    );

    parts.join(", ")
}

fn products_text(record: &InvoiceRecord, style: SummaryStyle) -> String {
    if record.products.is_empty() {
        return SUMMARY_PLACEHOLDER.to_string();
    }
    let items: Vec<String> = record
        .products
        .iter()
        .map(|p| {
            let name = p.name_or(SUMMARY_PLACEHOLDER);
            match style {
                SummaryStyle::Compact => name.to_string(),
                SummaryStyle::Detailed => format!(
                    "{} (Menge: {}, Einzelpreis: {}, Gesamt: {})",
                    name, p.quantity, p.unit_price, p.total
                ),
            }
        })
        .collect();
    items.join(", ")
}

/// 发票 -> 训练样本, 标签原样嵌入
pub fn to_training_pair(record: &InvoiceRecord, style: SummaryStyle) -> TrainingPair {
    TrainingPair {
        text: summarize(record, style),
        label: record.clone(),
    }
}

pub fn to_training_pairs(records: &[InvoiceRecord], style: SummaryStyle) -> Vec<TrainingPair> {
    let pairs: Vec<_> = records
        .iter()
        .map(|r| to_training_pair(r, style))
        .collect();
    tracing::info!("Serialized {} training pairs", pairs.len());
    pairs
}
