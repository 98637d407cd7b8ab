use crate::service::PipelineService;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 共享状态: 流水线服务 + 按输出目录划分的互斥锁
pub struct AppState {
    pub service: Arc<PipelineService>,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl AppState {
    pub fn new(service: PipelineService) -> Self {
        Self {
            service: Arc::new(service),
            locks: DashMap::new(),
        }
    }

    /// 获取目录对应的锁, 不存在则创建
    pub fn lock_for(&self, dir: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(dir.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn same_directory_shares_one_lock() {
        let state = AppState::new(PipelineService::new(AppConfig::default()));
        let a = state.lock_for(Path::new("/out"));
        let b = state.lock_for(Path::new("/out"));
        let c = state.lock_for(Path::new("/other"));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
