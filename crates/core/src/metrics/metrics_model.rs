use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};
use crate::platforms::Platform;

/// Window of earnings history the dashboard looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimePeriod {
    #[serde(rename = "3")]
    Last3Months,
    #[serde(rename = "6")]
    Last6Months,
    #[serde(rename = "12")]
    Last12Months,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl TimePeriod {
    /// Length of the window in months, `None` for the full history.
    pub fn months(&self) -> Option<u32> {
        match self {
            TimePeriod::Last3Months => Some(3),
            TimePeriod::Last6Months => Some(6),
            TimePeriod::Last12Months => Some(12),
            TimePeriod::All => None,
        }
    }
}

impl FromStr for TimePeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3" => Ok(TimePeriod::Last3Months),
            "6" => Ok(TimePeriod::Last6Months),
            "12" => Ok(TimePeriod::Last12Months),
            "all" | "" => Ok(TimePeriod::All),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown time period '{}', expected 3, 6, 12 or all",
                other
            )))),
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.months() {
            Some(months) => write!(f, "{}", months),
            None => f.write_str("all"),
        }
    }
}

/// Net income earned on one platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformShare {
    pub platform: Platform,
    pub amount: Decimal,
    /// Share of total net income, 0 to 100
    pub percentage: Decimal,
}

/// Net income earned in one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyIncome {
    /// Three letter month label, e.g. "Jan"
    pub month: String,
    pub year: i32,
    pub income: Decimal,
}

/// Aggregated income figures for a worker. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncomeMetrics {
    pub period: TimePeriod,
    pub gross_income: Decimal,
    pub total_net_income: Decimal,
    /// 0 to 850
    pub stability_score: u32,
    pub active_days: u32,
    pub active_weeks: u32,
    pub total_weeks: u32,
    pub transaction_count: usize,
    pub platform_breakdown: Vec<PlatformShare>,
    pub monthly_data: Vec<MonthlyIncome>,
    /// Month over month change of the last two months, in percent
    pub trend: Decimal,
}
