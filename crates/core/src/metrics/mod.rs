//! Metrics module - income aggregation and stability scoring.

mod metrics_calculator;
mod metrics_model;
mod metrics_service;

pub use metrics_calculator::{aggregate, month_over_month_trend, stability_score};
pub use metrics_model::{IncomeMetrics, MonthlyIncome, PlatformShare, TimePeriod};
pub use metrics_service::{MetricsService, MetricsServiceTrait};
