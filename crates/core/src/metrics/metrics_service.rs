use log::debug;
use std::sync::Arc;

use super::metrics_calculator::aggregate;
use super::metrics_model::IncomeMetrics;
use crate::errors::{Error, Prerequisite, Result};
use crate::session::SessionContext;
use crate::uploads::UploadRepositoryTrait;

/// Trait defining the contract for income metrics operations.
pub trait MetricsServiceTrait: Send + Sync {
    /// Computes metrics for the session's time period and caches the snapshot
    /// in the session.
    fn get_income_metrics(&self, session: &mut SessionContext) -> Result<IncomeMetrics>;
}

pub struct MetricsService {
    upload_repository: Arc<dyn UploadRepositoryTrait>,
}

impl MetricsService {
    pub fn new(upload_repository: Arc<dyn UploadRepositoryTrait>) -> Self {
        Self { upload_repository }
    }
}

impl MetricsServiceTrait for MetricsService {
    fn get_income_metrics(&self, session: &mut SessionContext) -> Result<IncomeMetrics> {
        if let Some(cached) = session.metrics() {
            if cached.period == session.time_period {
                return Ok(cached.clone());
            }
        }

        if self.upload_repository.list_uploads(&session.user_id)?.is_empty() {
            return Err(Error::PrerequisiteMissing(Prerequisite::Upload));
        }

        let transactions = self.upload_repository.list_transactions(&session.user_id)?;
        let metrics = aggregate(&transactions, session.time_period);
        debug!(
            "Computed metrics for user {} over {} transactions (period {}): net {}, score {}",
            session.user_id,
            metrics.transaction_count,
            metrics.period,
            metrics.total_net_income,
            metrics.stability_score
        );

        session.set_metrics(metrics.clone());
        Ok(metrics)
    }
}
