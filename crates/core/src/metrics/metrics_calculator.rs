//! Pure income aggregation over a worker's transactions.

use chrono::{Datelike, Months, NaiveDate};
use num_traits::Zero;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::metrics_model::{IncomeMetrics, MonthlyIncome, PlatformShare, TimePeriod};
use crate::constants::{
    DISPLAY_DECIMAL_PRECISION, NET_RETENTION_FACTOR, STABILITY_SCORE_MAX, TOTAL_WEEKS,
};
use crate::platforms::Platform;
use crate::uploads::Transaction;

/// Stability score on a 0-850 scale.
///
/// `active_days / 7` approximates the number of active weeks, which is then
/// compared against a fixed window of `TOTAL_WEEKS` (26) weeks:
/// `min(850, floor(850 * active_days / (7 * 26)))`.
pub fn stability_score(active_days: u32) -> u32 {
    let max = u64::from(STABILITY_SCORE_MAX);
    let score = max * u64::from(active_days) / (7 * u64::from(TOTAL_WEEKS));
    score.min(max) as u32
}

/// Percentage change from the second to last month to the last month.
///
/// Zero when there are fewer than two months or the earlier month has no
/// positive income.
pub fn month_over_month_trend(monthly: &[MonthlyIncome]) -> Decimal {
    match monthly {
        [.., previous, current] if previous.income > Decimal::zero() => current
            .income
            .checked_sub(previous.income)
            .and_then(|change| change.checked_div(previous.income))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp(DISPLAY_DECIMAL_PRECISION))
            .unwrap_or_else(Decimal::zero),
        _ => Decimal::zero(),
    }
}

/// Aggregates transactions into income metrics for the given period.
///
/// Windows are anchored at the latest dated transaction. Undated transactions
/// only count towards `TimePeriod::All` and never appear in the monthly series.
/// Sums saturate at the `Decimal` bounds instead of overflowing.
pub fn aggregate(transactions: &[Transaction], period: TimePeriod) -> IncomeMetrics {
    let in_period = select_period(transactions, period);

    let gross_income = in_period
        .iter()
        .fold(Decimal::zero(), |acc, t| acc.saturating_add(t.amount));
    let total_net_income = gross_income.saturating_mul(NET_RETENTION_FACTOR);

    let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    let mut by_platform: HashMap<Platform, Decimal> = HashMap::new();
    let mut active_dates: HashSet<NaiveDate> = HashSet::new();

    for transaction in &in_period {
        let net = transaction.amount.saturating_mul(NET_RETENTION_FACTOR);
        let platform_net = by_platform.entry(transaction.platform).or_insert_with(Decimal::zero);
        *platform_net = platform_net.saturating_add(net);

        if let Some(date) = transaction.transaction_date {
            let month_net = by_month
                .entry((date.year(), date.month()))
                .or_insert_with(Decimal::zero);
            *month_net = month_net.saturating_add(net);
            active_dates.insert(date);
        }
    }

    let platform_total = by_platform
        .values()
        .fold(Decimal::zero(), |acc, amount| acc.saturating_add(*amount));
    let mut platform_breakdown: Vec<PlatformShare> = by_platform
        .into_iter()
        .map(|(platform, amount)| PlatformShare {
            platform,
            amount: amount.round_dp(DISPLAY_DECIMAL_PRECISION),
            percentage: percentage_of(amount, platform_total),
        })
        .collect();
    platform_breakdown.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.platform.as_str().cmp(b.platform.as_str()))
    });

    let monthly_data: Vec<MonthlyIncome> = by_month
        .into_iter()
        .map(|((year, month), income)| MonthlyIncome {
            month: month_label(year, month),
            year,
            income: income.round_dp(DISPLAY_DECIMAL_PRECISION),
        })
        .collect();

    let active_days = active_dates.len() as u32;

    IncomeMetrics {
        period,
        gross_income: gross_income.round_dp(DISPLAY_DECIMAL_PRECISION),
        total_net_income: total_net_income.round_dp(DISPLAY_DECIMAL_PRECISION),
        stability_score: stability_score(active_days),
        active_days,
        active_weeks: active_days / 7,
        total_weeks: TOTAL_WEEKS,
        transaction_count: in_period.len(),
        trend: month_over_month_trend(&monthly_data),
        platform_breakdown,
        monthly_data,
    }
}

fn select_period(transactions: &[Transaction], period: TimePeriod) -> Vec<&Transaction> {
    let Some(months) = period.months() else {
        return transactions.iter().collect();
    };

    let Some(latest) = transactions.iter().filter_map(|t| t.transaction_date).max() else {
        return Vec::new();
    };
    let start = latest
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);

    transactions
        .iter()
        .filter(|t| t.transaction_date.is_some_and(|date| date > start))
        .collect()
}

fn percentage_of(part: Decimal, total: Decimal) -> Decimal {
    part.checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(DISPLAY_DECIMAL_PRECISION))
        .unwrap_or_else(Decimal::zero)
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default()
}
