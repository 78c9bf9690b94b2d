//! Per-user state carried across the upload → dashboard → certificate flow.

use crate::certificates::Certificate;
use crate::constants::DEFAULT_WORKER_NAME;
use crate::metrics::{IncomeMetrics, TimePeriod};

/// Explicit session state handed to services.
///
/// Holds the last computed metrics snapshot and the certificate issued from
/// it. Any change to the underlying transactions must call [`invalidate`].
///
/// [`invalidate`]: SessionContext::invalidate
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub user_id: String,
    pub worker_name: String,
    pub time_period: TimePeriod,
    metrics: Option<IncomeMetrics>,
    certificate: Option<Certificate>,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            worker_name: DEFAULT_WORKER_NAME.to_string(),
            time_period: TimePeriod::default(),
            metrics: None,
            certificate: None,
        }
    }

    pub fn with_worker_name(mut self, worker_name: impl Into<String>) -> Self {
        let name = worker_name.into();
        if !name.trim().is_empty() {
            self.worker_name = name.trim().to_string();
        }
        self
    }

    pub fn metrics(&self) -> Option<&IncomeMetrics> {
        self.metrics.as_ref()
    }

    pub fn set_metrics(&mut self, metrics: IncomeMetrics) {
        self.metrics = Some(metrics);
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    pub fn set_certificate(&mut self, certificate: Certificate) {
        self.certificate = Some(certificate);
    }

    pub fn clear_certificate(&mut self) {
        self.certificate = None;
    }

    /// Switches the dashboard window. A different window drops the cached
    /// metrics so they are recomputed on next access.
    pub fn set_time_period(&mut self, period: TimePeriod) {
        if self.time_period != period {
            self.time_period = period;
            self.metrics = None;
        }
    }

    /// Drops every derived value after the user's transactions changed.
    pub fn invalidate(&mut self) {
        self.metrics = None;
        self.certificate = None;
    }
}
