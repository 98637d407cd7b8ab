use crate::error::{PipelineError, Result};
use crate::models::{InvoiceRecord, ModelDescriptor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// 确保目录存在 (幂等)
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

/// 删除文件; 不存在不算错误
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PipelineError::io(path, e)),
    }
}

/// 原子写入: 先写同目录临时文件, 再 rename 覆盖目标
///
/// 失败时目标文件保持原状, 不会留下截断的内容。
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| PipelineError::io(path, e))?;
    tmp.flush().map_err(|e| PipelineError::io(path, e))?;
    tmp.persist(path).map_err(|e| PipelineError::io(path, e.error))?;
    Ok(())
}

/// 写出分组 JSON (单个数组, 缩进格式)
pub fn write_grouped_json(path: &Path, records: &[InvoiceRecord]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(records).map_err(|e| PipelineError::json(path, e))?;
    write_atomic(path, &bytes)
}

pub fn read_grouped_json(path: &Path) -> Result<Vec<InvoiceRecord>> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| PipelineError::json(path, e))
}

/// 写出 JSONL: 每行一个对象
pub fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let mut buf = Vec::new();
    for item in items {
        serde_json::to_writer(&mut buf, item).map_err(|e| PipelineError::json(path, e))?;
        buf.push(b'\n');
    }
    write_atomic(path, &buf)
}

/// 读取 JSONL, 忽略空行
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(|e| PipelineError::json(path, e)))
        .collect()
}

pub fn write_model(path: &Path, model: &ModelDescriptor) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(model).map_err(|e| PipelineError::json(path, e))?;
    write_atomic(path, &bytes)
}

pub fn read_model(path: &Path) -> Result<ModelDescriptor> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| PipelineError::json(path, e))
}
