use crate::config::PreprocessConfig;
use crate::models::TrainingPair;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub const DEFAULT_MAX_LENGTH: usize = 4096;

/// 序列预处理: 截断摘要文本, 可选打乱顺序
#[derive(Debug, Clone)]
pub struct Preprocessor {
    max_length: usize,
    shuffle: bool,
    seed: Option<u64>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            shuffle: false,
            seed: None,
        }
    }
}

impl Preprocessor {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            ..Default::default()
        }
    }

    pub fn from_config(config: &PreprocessConfig) -> Self {
        Self {
            max_length: config.max_length,
            shuffle: config.shuffle,
            seed: config.seed,
        }
    }

    /// 开启打乱; 给定种子时结果可复现, 否则使用线程随机源
    pub fn with_shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn process(&self, pairs: &[TrainingPair]) -> Vec<TrainingPair> {
        let mut out: Vec<TrainingPair> = pairs
            .iter()
            .map(|p| TrainingPair {
                text: truncate_chars(&p.text, self.max_length),
                label: p.label.clone(),
            })
            .collect();

        if self.shuffle {
            match self.seed {
                Some(seed) => out.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => out.shuffle(&mut rand::rng()),
            }
        }

        tracing::info!(
            "Preprocessed {} pairs (max_length={}, shuffle={})",
            out.len(),
            self.max_length,
            self.shuffle
        );
        out
    }
}

/// 按字符 (Unicode 标量) 截取前缀, 不考虑单词边界
pub fn truncate_chars(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
