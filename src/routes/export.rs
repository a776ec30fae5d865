use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    services::export::{self, ExportFormat},
};

pub async fn csv(State(state): State<AppState>) -> AppResult<Response> {
    download(state, ExportFormat::Csv).await
}

pub async fn xlsx(State(state): State<AppState>) -> AppResult<Response> {
    download(state, ExportFormat::Xlsx).await
}

async fn download(state: AppState, format: ExportFormat) -> AppResult<Response> {
    let movies = state.repository.list().await?;
    tracing::info!(movies = movies.len(), format = format.extension(), "Exporting catalog");

    let bytes = tokio::task::spawn_blocking(move || export::export(&movies, format))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let disposition = format!("attachment; filename=\"{}\"", format.file_name(Utc::now()));

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
