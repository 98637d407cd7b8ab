use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// 单个已生成的文档
#[derive(Debug, Clone, Serialize)]
pub struct RenderedDocument {
    pub invoice_number: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// 单条记录渲染失败 (不影响同批其他记录)
#[derive(Debug, Clone, Serialize)]
pub struct RenderFailure {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// 批量渲染结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderReport {
    pub documents: Vec<RenderedDocument>,
    pub failures: Vec<RenderFailure>,
}

impl RenderReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// 完整流水线运行结果
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub records: usize,
    pub grouped_json: PathBuf,
    pub training_jsonl: PathBuf,
    pub preprocessed_jsonl: PathBuf,
    pub model: Option<PathBuf>,
    pub render: RenderReport,
    pub finished_at: DateTime<Utc>,
}

impl PipelineReport {
    /// 面向命令行/上传方的摘要
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Records: {}", self.records),
            format!("Grouped JSON: {}", self.grouped_json.display()),
            format!("Training data: {}", self.training_jsonl.display()),
            format!("Preprocessed data: {}", self.preprocessed_jsonl.display()),
        ];
        match &self.model {
            Some(path) => lines.push(format!("Model: {}", path.display())),
            None => lines.push("Model: skipped (no records)".to_string()),
        }
        lines.push(format!(
            "Documents: {} written, {} failed",
            self.render.documents.len(),
            self.render.failure_count()
        ));
        for doc in &self.render.documents {
            lines.push(format!("  {}", doc.path.display()));
        }
        lines.join("\n")
    }
}

/// 外部调用约定: 退出码 + 标准输出 + 标准错误
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub report: Option<PipelineReport>,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
