use crate::service::preprocessor::DEFAULT_MAX_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 应用配置
///
/// 进程启动时构建一次, 显式传给各组件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub preprocess: PreprocessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 生成文档下载链接时使用的前缀
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// 上传的客户文件
    pub customers_dir: PathBuf,
    /// 生成的 PDF
    pub documents_dir: PathBuf,
    /// 中间产物: 训练数据、预处理数据、模型描述
    pub work_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub max_length: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                public_base_url: "http://127.0.0.1:5000".to_string(),
            },
            paths: PathsConfig {
                customers_dir: PathBuf::from("./data/customers"),
                documents_dir: PathBuf::from("./data/output/customer_pdfs"),
                work_dir: PathBuf::from("./data/output"),
            },
            preprocess: PreprocessConfig::default(),
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            shuffle: false,
            seed: None,
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> pipeline.toml (可选) -> 环境变量
    ///
    /// 环境变量以 `PIPELINE_` 开头, 层级用 `__` 分隔, 如 `PIPELINE_SERVER__PORT=8080`。
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("pipeline").required(false))
            .add_source(
                config::Environment::with_prefix("PIPELINE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 所有目录以 `root` 为根 (测试和临时运行用)
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut config = Self::default();
        config.paths = PathsConfig {
            customers_dir: root.join("customers"),
            documents_dir: root.join("output/customer_pdfs"),
            work_dir: root.join("output"),
        };
        config
    }

    pub fn training_jsonl(&self) -> PathBuf {
        self.paths.work_dir.join("training_data.jsonl")
    }

    pub fn preprocessed_jsonl(&self) -> PathBuf {
        self.paths
            .work_dir
            .join("preprocessed")
            .join("preprocessed_data.jsonl")
    }

    pub fn model_path(&self) -> PathBuf {
        self.paths
            .work_dir
            .join("trained_model")
            .join("model.json")
    }

    pub fn document_url(&self, file_name: &str) -> String {
        format!(
            "{}/pdfs/{}",
            self.server.public_base_url.trim_end_matches('/'),
            file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_sources() {
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.preprocess.max_length, 4096);
        assert!(!config.preprocess.shuffle);
    }

    #[test]
    fn artifact_paths_live_under_work_dir() {
        let config = AppConfig::rooted_at("/tmp/run");
        assert_eq!(
            config.model_path(),
            PathBuf::from("/tmp/run/output/trained_model/model.json")
        );
        assert_eq!(
            config.preprocessed_jsonl(),
            PathBuf::from("/tmp/run/output/preprocessed/preprocessed_data.jsonl")
        );
        assert_eq!(
            config.document_url("Alice_invoice.pdf"),
            "http://127.0.0.1:5000/pdfs/Alice_invoice.pdf"
        );
    }
}
