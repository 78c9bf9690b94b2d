use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState, session::UserSession};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use kamai_core::metrics::{IncomeMetrics, TimePeriod};
use serde::Deserialize;

#[derive(Deserialize)]
struct MetricsQuery {
    period: Option<String>,
}

async fn get_income_metrics(
    State(state): State<Arc<AppState>>,
    UserSession(session): UserSession,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<Json<IncomeMetrics>> {
    let mut session = session.lock().await;
    if let Some(period) = query.period.as_deref() {
        session.set_time_period(period.parse::<TimePeriod>()?);
    }
    let metrics = state.metrics_service.get_income_metrics(&mut session)?;
    Ok(Json(metrics))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/metrics", get(get_income_metrics))
}
