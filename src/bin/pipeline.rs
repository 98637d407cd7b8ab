//! 流水线命令行: 每个阶段可单独执行, `run` 执行全部阶段

use clap::{Parser, Subcommand, ValueEnum};
use invoice_pipeline_rust::models::{InvoiceRecord, TrainingPair};
use invoice_pipeline_rust::service::{
    aggregate_rows, simulate_training, to_training_pairs, DocumentRenderer, PipelineService,
    Preprocessor, SummaryStyle,
};
use invoice_pipeline_rust::{init_tracing, store, AppConfig, PipelineError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pipeline", about = "Invoice CSV -> JSON -> JSONL -> model -> PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Style {
    Compact,
    Detailed,
}

impl From<Style> for SummaryStyle {
    fn from(s: Style) -> Self {
        match s {
            Style::Compact => SummaryStyle::Compact,
            Style::Detailed => SummaryStyle::Detailed,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// 全部阶段 (输入为 .csv 或分组 .json)
    Run {
        input: PathBuf,
        #[arg(long, value_enum, default_value = "compact")]
        style: Style,
    },
    /// CSV -> 分组 JSON
    Aggregate { csv: PathBuf, json: PathBuf },
    /// 分组 JSON (或 CSV) -> 训练 JSONL
    ToJsonl {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum, default_value = "compact")]
        style: Style,
    },
    /// 截断 / 打乱训练 JSONL
    Preprocess {
        input: PathBuf,
        output_dir: PathBuf,
        #[arg(long, default_value_t = 4096)]
        max_length: usize,
        #[arg(long)]
        shuffle: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// 模拟训练, 写出模型描述
    Train { input: PathBuf, output: PathBuf },
    /// 分组 JSON -> 每条记录一个 PDF
    Render { input: PathBuf, output_dir: PathBuf },
    /// 模型描述中的示例 -> PDF
    Infer { model: PathBuf, output: PathBuf },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match execute(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Fehler: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_records(input: &Path) -> Result<Vec<InvoiceRecord>, PipelineError> {
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => aggregate_rows(&store::read_rows(input)?),
        _ => store::read_grouped_json(input),
    }
}

fn execute(command: Command) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Run { input, style } => {
            let service = PipelineService::new(AppConfig::from_env()?).with_style(style.into());
            let outcome = service.run_entry(&input);
            if !outcome.stdout.is_empty() {
                println!("{}", outcome.stdout);
            }
            if !outcome.stderr.is_empty() {
                eprintln!("{}", outcome.stderr);
            }
            return Ok(ExitCode::from(outcome.exit_code as u8));
        }
        Command::Aggregate { csv, json } => {
            let records = aggregate_rows(&store::read_rows(&csv)?)?;
            store::write_grouped_json(&json, &records)?;
            println!("JSON-Datei erfolgreich erstellt: {}", json.display());
        }
        Command::ToJsonl {
            input,
            output,
            style,
        } => {
            let pairs = to_training_pairs(&load_records(&input)?, style.into());
            store::write_jsonl(&output, &pairs)?;
            println!("JSONL-Datei erfolgreich erstellt: {}", output.display());
        }
        Command::Preprocess {
            input,
            output_dir,
            max_length,
            shuffle,
            seed,
        } => {
            let pairs: Vec<TrainingPair> = store::read_jsonl(&input)?;
            let mut pre = Preprocessor::new(max_length);
            if shuffle {
                pre = pre.with_shuffle(seed);
            }
            let output = output_dir.join("preprocessed_data.jsonl");
            store::write_jsonl(&output, &pre.process(&pairs))?;
            println!("Preprocessing abgeschlossen: {}", output.display());
        }
        Command::Train { input, output } => {
            let pairs: Vec<TrainingPair> = store::read_jsonl(&input)?;
            println!("Trainingsdaten geladen: {} Einträge", pairs.len());
            let model = simulate_training(&pairs)?;
            store::write_model(&output, &model)?;
            println!("Modell gespeichert unter: {}", output.display());
        }
        Command::Render { input, output_dir } => {
            let records = load_records(&input)?;
            let report = DocumentRenderer::new(&output_dir).render_batch(&records);
            for doc in &report.documents {
                println!("PDF erstellt: {}", doc.path.display());
            }
            for failure in &report.failures {
                eprintln!(
                    "Fehler beim Erstellen des PDFs für {}: {}",
                    failure.name, failure.reason
                );
            }
            if report.failure_count() > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Infer { model, output } => {
            let descriptor = store::read_model(&model)?;
            let dir = output.parent().unwrap_or_else(|| Path::new("."));
            DocumentRenderer::new(dir).render_exemplar(&descriptor, &output)?;
            println!("PDF erfolgreich erstellt: {}", output.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
