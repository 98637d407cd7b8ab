use serde::{Deserialize, Serialize};

use super::invoice::InvoiceRecord;

/// 训练样本: 自然语言摘要 + 原始结构化发票
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingPair {
    pub text: String,
    #[serde(default)]
    pub label: InvoiceRecord,
}

/// 模拟训练产物 (不是真实模型)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub model_name: String,
    pub status: String,
    pub fields: Vec<String>,
    pub example: TrainingPair,
}
