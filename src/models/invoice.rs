use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 摘要文本中缺失字段的占位符
pub const SUMMARY_PLACEHOLDER: &str = "Unbekannt";
/// 发票文档中缺失字段的占位符
pub const DOCUMENT_PLACEHOLDER: &str = "Nicht angegeben";

/// 明细行 CSV 列名
pub const PRODUCT_NAME_COLUMN: &str = "Product Name";
pub const QUANTITY_COLUMN: &str = "Quantity";
pub const UNIT_PRICE_COLUMN: &str = "Unit Price";
pub const PRODUCT_TOTAL_COLUMN: &str = "Product Total";

/// 输入表格必须包含的全部列 (标量字段 + 明细字段)
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    InvoiceField::ALL.into_iter().map(InvoiceField::column).chain([
        PRODUCT_NAME_COLUMN,
        QUANTITY_COLUMN,
        UNIT_PRICE_COLUMN,
        PRODUCT_TOTAL_COLUMN,
    ])
}

/// 客户发票 (按发票号聚合后的结果)
///
/// 标量字段为空串即视为缺失, 由 [`InvoiceRecord::value_or`] 统一替换占位符。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub products: Vec<LineItem>,
    pub total_amount: String,
    pub payment_due: String,
    pub comments: String,
}

/// 发票明细行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
}

/// 发票标量字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceField {
    Name,
    Address,
    Phone,
    Email,
    InvoiceNumber,
    InvoiceDate,
    TotalAmount,
    PaymentDue,
    Comments,
}

impl InvoiceField {
    pub const ALL: [InvoiceField; 9] = [
        InvoiceField::Name,
        InvoiceField::Address,
        InvoiceField::Phone,
        InvoiceField::Email,
        InvoiceField::InvoiceNumber,
        InvoiceField::InvoiceDate,
        InvoiceField::TotalAmount,
        InvoiceField::PaymentDue,
        InvoiceField::Comments,
    ];

    /// CSV 表头列名
    pub fn column(self) -> &'static str {
        match self {
            InvoiceField::Name => "Name",
            InvoiceField::Address => "Address",
            InvoiceField::Phone => "Phone",
            InvoiceField::Email => "Email",
            InvoiceField::InvoiceNumber => "Invoice Number",
            InvoiceField::InvoiceDate => "Invoice Date",
            InvoiceField::TotalAmount => "Total Amount",
            InvoiceField::PaymentDue => "Payment Due",
            InvoiceField::Comments => "Comments",
        }
    }

    /// JSON 键名
    pub fn key(self) -> &'static str {
        match self {
            InvoiceField::Name => "name",
            InvoiceField::Address => "address",
            InvoiceField::Phone => "phone",
            InvoiceField::Email => "email",
            InvoiceField::InvoiceNumber => "invoice_number",
            InvoiceField::InvoiceDate => "invoice_date",
            InvoiceField::TotalAmount => "total_amount",
            InvoiceField::PaymentDue => "payment_due",
            InvoiceField::Comments => "comments",
        }
    }

    /// 德文标签 (摘要和文档共用)
    pub fn label(self) -> &'static str {
        match self {
            InvoiceField::Name => "Name",
            InvoiceField::Address => "Adresse",
            InvoiceField::Phone => "Telefon",
            InvoiceField::Email => "E-Mail",
            InvoiceField::InvoiceNumber => "Rechnungsnummer",
            InvoiceField::InvoiceDate => "Rechnungsdatum",
            InvoiceField::TotalAmount => "Gesamtbetrag",
            InvoiceField::PaymentDue => "Zahlungsziel",
            InvoiceField::Comments => "Kommentare",
        }
    }
}

impl InvoiceRecord {
    pub fn new(invoice_number: impl Into<String>) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, field: InvoiceField) -> &str {
        match field {
            InvoiceField::Name => &self.name,
            InvoiceField::Address => &self.address,
            InvoiceField::Phone => &self.phone,
            InvoiceField::Email => &self.email,
            InvoiceField::InvoiceNumber => &self.invoice_number,
            InvoiceField::InvoiceDate => &self.invoice_date,
            InvoiceField::TotalAmount => &self.total_amount,
            InvoiceField::PaymentDue => &self.payment_due,
            InvoiceField::Comments => &self.comments,
        }
    }

    pub fn set(&mut self, field: InvoiceField, value: impl Into<String>) {
        let slot = match field {
            InvoiceField::Name => &mut self.name,
            InvoiceField::Address => &mut self.address,
            InvoiceField::Phone => &mut self.phone,
            InvoiceField::Email => &mut self.email,
            InvoiceField::InvoiceNumber => &mut self.invoice_number,
            InvoiceField::InvoiceDate => &mut self.invoice_date,
            InvoiceField::TotalAmount => &mut self.total_amount,
            InvoiceField::PaymentDue => &mut self.payment_due,
            InvoiceField::Comments => &mut self.comments,
        };
        *slot = value.into();
    }

    /// 读取字段, 空值 (仅空白) 时返回占位符
    pub fn value_or<'a>(&'a self, field: InvoiceField, placeholder: &'a str) -> &'a str {
        let value = self.get(field);
        if value.trim().is_empty() {
            placeholder
        } else {
            value
        }
    }

    pub fn add_item(&mut self, item: LineItem) {
        self.products.push(item);
    }
}

impl LineItem {
    pub fn name_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        if self.product_name.trim().is_empty() {
            placeholder
        } else {
            &self.product_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn value_or_substitutes_blank_fields() {
        let mut record = InvoiceRecord::new("INV1");
        record.set(InvoiceField::Name, "Alice");
        record.set(InvoiceField::Phone, "   ");

        assert_eq!(record.value_or(InvoiceField::Name, SUMMARY_PLACEHOLDER), "Alice");
        assert_eq!(record.value_or(InvoiceField::Phone, SUMMARY_PLACEHOLDER), "Unbekannt");
        assert_eq!(record.value_or(InvoiceField::Email, DOCUMENT_PLACEHOLDER), "Nicht angegeben");
        assert_eq!(record.get(InvoiceField::InvoiceNumber), "INV1");
    }

    #[test]
    fn missing_json_keys_fall_back_to_defaults() {
        let record: InvoiceRecord =
            serde_json::from_str(r#"{"name": "Bob", "products": [{"product_name": "Widget"}]}"#)
                .unwrap();

        assert_eq!(record.name, "Bob");
        assert!(record.invoice_number.is_empty());
        assert_eq!(record.products.len(), 1);
        assert_eq!(record.products[0].quantity, 0);
    }

    #[test]
    fn decimals_accept_numbers_and_strings() {
        let item: LineItem = serde_json::from_str(
            r#"{"product_name": "Gadget", "quantity": 1, "unit_price": 20.0, "total": "20.00"}"#,
        )
        .unwrap();

        assert_eq!(item.unit_price, BigDecimal::from_str("20").unwrap());
        assert_eq!(item.total, BigDecimal::from_str("20.00").unwrap());
    }

    #[test]
    fn columns_and_keys_cover_all_fields() {
        let columns: Vec<_> = InvoiceField::ALL.iter().map(|f| f.column()).collect();
        assert!(columns.contains(&"Invoice Number"));
        assert!(columns.contains(&"Payment Due"));
        let keys: Vec<_> = InvoiceField::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(keys.len(), 9);
        assert!(keys.contains(&"total_amount"));
    }
}
