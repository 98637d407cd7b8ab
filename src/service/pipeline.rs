use crate::config::AppConfig;
use crate::error::{PipelineError, Result};
use crate::models::{InvoiceRecord, PipelineReport, RunOutcome};
use crate::service::aggregator::aggregate_rows;
use crate::service::model_stub::simulate_training;
use crate::service::preprocessor::Preprocessor;
use crate::service::renderer::DocumentRenderer;
use crate::service::serializer::{to_training_pairs, SummaryStyle};
use crate::store;
use chrono::Utc;
use std::error::Error as _;
use std::path::{Path, PathBuf};

/// 完整流水线: CSV/JSON -> 分组 JSON -> JSONL -> 预处理 -> 模型描述 -> PDF
pub struct PipelineService {
    config: AppConfig,
    style: SummaryStyle,
}

impl PipelineService {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            style: SummaryStyle::default(),
        }
    }

    pub fn with_style(mut self, style: SummaryStyle) -> Self {
        self.style = style;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 读取 CSV 并聚合, 结果写到同名 .json (聚合失败时不写任何文件)
    pub fn convert_csv(&self, csv_path: &Path, json_path: &Path) -> Result<Vec<InvoiceRecord>> {
        let rows = store::read_rows(csv_path)?;
        let records = aggregate_rows(&rows)?;
        store::write_grouped_json(json_path, &records)?;
        tracing::info!("JSON-Datei erfolgreich erstellt: {}", json_path.display());
        Ok(records)
    }

    /// 按扩展名加载输入; 返回记录和分组 JSON 的路径
    pub fn load_input(&self, input: &Path) -> Result<(Vec<InvoiceRecord>, PathBuf)> {
        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => {
                let json_path = input.with_extension("json");
                let records = self.convert_csv(input, &json_path)?;
                Ok((records, json_path))
            }
            Some("json") => Ok((store::read_grouped_json(input)?, input.to_path_buf())),
            _ => Err(PipelineError::UnsupportedInput {
                path: input.to_path_buf(),
            }),
        }
    }

    pub fn run(&self, input: &Path) -> Result<PipelineReport> {
        tracing::info!("Pipeline gestartet für {}", input.display());
        store::ensure_dir(&self.config.paths.work_dir)?;
        store::ensure_dir(&self.config.paths.documents_dir)?;

        // 1. 聚合
        let (records, grouped_json) = self.load_input(input)?;

        // 2. 序列化为训练样本
        let pairs = to_training_pairs(&records, self.style);
        let training_jsonl = self.config.training_jsonl();
        store::write_jsonl(&training_jsonl, &pairs)?;

        // 3. 预处理
        let preprocessed = Preprocessor::from_config(&self.config.preprocess).process(&pairs);
        let preprocessed_jsonl = self.config.preprocessed_jsonl();
        store::write_jsonl(&preprocessed_jsonl, &preprocessed)?;

        // 4. 模拟训练; 没有记录时跳过
        let model = match simulate_training(&preprocessed) {
            Ok(descriptor) => {
                let path = self.config.model_path();
                store::write_model(&path, &descriptor)?;
                tracing::info!("Modell gespeichert unter: {}", path.display());
                Some(path)
            }
            Err(PipelineError::EmptyDataset) => {
                // 旧模型的示例属于其他输入, 不能留在磁盘上
                store::remove_if_exists(&self.config.model_path())?;
                tracing::warn!(
                    "Keine Datensätze in {}, Modellschritt übersprungen",
                    input.display()
                );
                None
            }
            Err(e) => return Err(e),
        };

        // 5. 渲染 PDF (单条失败不影响其他记录)
        let render = DocumentRenderer::new(&self.config.paths.documents_dir).render_batch(&records);

        let report = PipelineReport {
            records: records.len(),
            grouped_json,
            training_jsonl,
            preprocessed_jsonl,
            model,
            render,
            finished_at: Utc::now(),
        };
        tracing::info!(
            "Pipeline abgeschlossen: {} Datensätze, {} Dokumente, {} fehlgeschlagen",
            report.records,
            report.render.documents.len(),
            report.render.failure_count()
        );
        Ok(report)
    }

    /// 外部调用入口: 退出码 0 成功, 1 失败
    pub fn run_entry(&self, input: &Path) -> RunOutcome {
        match self.run(input) {
            Ok(report) => RunOutcome {
                exit_code: 0,
                stdout: report.summary(),
                stderr: String::new(),
                report: Some(report),
            },
            Err(e) => {
                tracing::error!("Pipeline fehlgeschlagen für {}: {}", input.display(), e);
                RunOutcome {
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: error_chain(&e),
                    report: None,
                }
            }
        }
    }
}

fn error_chain(e: &PipelineError) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
