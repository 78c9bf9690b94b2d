use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    session::UserSession,
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use kamai_core::uploads::{Transaction, UploadSummary, UploadedFile};

const FILE_FIELD: &str = "file";

async fn upload_file(
    State(state): State<Arc<AppState>>,
    UserSession(session): UserSession,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadSummary>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
        upload = Some((filename, data.to_vec()));
        break;
    }

    let (filename, content) = upload
        .ok_or_else(|| ApiError::BadRequest(format!("Missing multipart field '{}'", FILE_FIELD)))?;

    let mut session = session.lock().await;
    let summary = state
        .upload_service
        .upload_csv(&mut session, &filename, &content)
        .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn list_uploads(
    State(state): State<Arc<AppState>>,
    UserSession(session): UserSession,
) -> ApiResult<Json<Vec<UploadedFile>>> {
    let session = session.lock().await;
    let uploads = state.upload_service.list_uploads(&session)?;
    Ok(Json(uploads))
}

async fn get_upload_transactions(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    UserSession(session): UserSession,
) -> ApiResult<Json<Vec<Transaction>>> {
    let session = session.lock().await;
    let transactions = state.upload_service.get_upload_transactions(&session, &id)?;
    Ok(Json(transactions))
}

async fn delete_upload(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    UserSession(session): UserSession,
) -> ApiResult<StatusCode> {
    let mut session = session.lock().await;
    state.upload_service.delete_upload(&mut session, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/uploads",
            get(list_uploads)
                .post(upload_file)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/uploads/{id}", delete(delete_upload))
        .route("/uploads/{id}/transactions", get(get_upload_transactions))
}
