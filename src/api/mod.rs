pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use handlers::{download_pdf, health_check, upload};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(upload))
        .route("/pdfs/:filename", get(download_pdf))
        .with_state(state)
}
