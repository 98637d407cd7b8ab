use std::path::PathBuf;
use thiserror::Error;

/// 流水线错误
///
/// `row` 为数据行的零基序号 (不含表头)。
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing required column '{column}'{}", row_suffix(.row))]
    Schema {
        column: String,
        row: Option<usize>,
    },

    #[error("row {row}: cannot parse {field} from '{value}'")]
    MalformedRow {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("dataset is empty, nothing to train on")]
    EmptyDataset,

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render document for '{name}': {reason}")]
    Render { name: String, reason: String },

    #[error("unsupported input file {} (expected .csv or .json)", .path.display())]
    UnsupportedInput { path: PathBuf },
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(r) => format!(" in row {}", r),
        None => " in header".to_string(),
    }
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// 是否属于输入数据问题 (上传方可修正)
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. }
                | Self::MalformedRow { .. }
                | Self::Csv { .. }
                | Self::Json { .. }
                | Self::UnsupportedInput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
