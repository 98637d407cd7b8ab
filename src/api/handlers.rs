use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::models::RenderFailure;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

/// 上传响应体
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub pdf_links: Vec<String>,
    /// 渲染失败的记录数 (部分成功时 > 0)
    pub render_failures: usize,
    pub failures: Vec<RenderFailure>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 上传客户文件并运行流水线
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Ungültige Anfrage: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Ungültige Anfrage: {}", e)))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("Keine Datei hochgeladen".to_string()))?;
    if file_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Leerer Dateiname".to_string()));
    }
    // 只保留文件名部分, 防止路径穿越
    let file_name = std::path::Path::new(&file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest(format!("Ungültiger Dateiname: {}", file_name)))?;

    let config = state.service.config().clone();

    // 保存输入和运行流水线都在锁内, 同一输出目录串行执行
    let lock = state.lock_for(&config.paths.documents_dir);
    let _guard = lock.lock().await;

    tokio::fs::create_dir_all(&config.paths.customers_dir)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let input_path = config.paths.customers_dir.join(&file_name);
    tokio::fs::write(&input_path, &bytes)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tracing::info!("Datei gespeichert unter {}", input_path.display());

    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || service.run_entry(&input_path))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if !outcome.success() {
        return Err(ApiError::Pipeline {
            details: outcome.stderr,
        });
    }
    tracing::debug!("Pipeline-Ausgabe: {}", outcome.stdout);

    let render = outcome.report.map(|r| r.render).unwrap_or_default();
    let pdf_links = render
        .documents
        .iter()
        .map(|d| config.document_url(&d.file_name))
        .collect();

    Ok(Json(UploadResponse {
        message: "Pipeline erfolgreich abgeschlossen".to_string(),
        pdf_links,
        render_failures: render.failure_count(),
        failures: render.failures,
    }))
}

/// 下载已生成的 PDF
pub async fn download_pdf(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.starts_with('.')
    {
        return Err(ApiError::BadRequest(format!(
            "Ungültiger Dateiname: {}",
            filename
        )));
    }

    let path = state.service.config().paths.documents_dir.join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(filename))
        }
        Err(e) => return Err(ApiError::Internal(e.to_string())),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}
