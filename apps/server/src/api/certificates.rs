use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState, session::UserSession};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use kamai_core::certificates::{Certificate, IssuedCertificate};

async fn issue_certificate(
    State(state): State<Arc<AppState>>,
    UserSession(session): UserSession,
) -> ApiResult<(StatusCode, Json<IssuedCertificate>)> {
    let mut session = session.lock().await;
    let issued = state
        .certificate_service
        .issue_certificate(&mut session)
        .await?;
    if let Some(warning) = &issued.warning {
        tracing::warn!("Certificate {} issued with warning: {}", issued.certificate.id, warning);
    }
    Ok((StatusCode::CREATED, Json(issued)))
}

async fn list_certificates(
    State(state): State<Arc<AppState>>,
    UserSession(session): UserSession,
) -> ApiResult<Json<Vec<Certificate>>> {
    let session = session.lock().await;
    let certificates = state.certificate_service.list_certificates(&session)?;
    Ok(Json(certificates))
}

async fn revoke_certificate(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    UserSession(session): UserSession,
) -> ApiResult<Json<Certificate>> {
    let mut session = session.lock().await;
    let revoked = state
        .certificate_service
        .revoke_certificate(&mut session, &id)
        .await?;
    Ok(Json(revoked))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/certificates", get(list_certificates).post(issue_certificate))
        .route("/certificates/{id}/revoke", post(revoke_certificate))
}
