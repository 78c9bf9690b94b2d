use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use kamai_core::certificates::VerificationResult;

/// Public lookup, no user header required.
async fn verify_certificate(
    Path(id_suffix): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<VerificationResult>> {
    let result = state.certificate_service.verify_certificate(&id_suffix)?;
    Ok(Json(result))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/verify/{id_suffix}", get(verify_certificate))
}
