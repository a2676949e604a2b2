//! 冲刺活动上传 API 处理器

use axum::{Json, extract::State};
use loyalty_engine::{IngestionBatch, IngestionReport};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{ApiResponse, SprintUploadRequest},
    error::AdminError,
    state::AppState,
};

/// 上传一个周期的冲刺活动
///
/// POST /api/ingestion/sprints
pub async fn upload_sprints(
    State(state): State<AppState>,
    Json(req): Json<SprintUploadRequest>,
) -> Result<Json<ApiResponse<IngestionReport>>, AdminError> {
    req.validate()?;

    let batch = IngestionBatch::from(req);
    let report = state.engine.ingestion().ingest(&batch)?;

    info!(
        label = %batch.label,
        credited = report.credited,
        marked_inactive = report.marked_inactive,
        "Sprint activity uploaded"
    );

    Ok(Json(ApiResponse::success(report)))
}
