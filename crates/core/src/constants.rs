use rust_decimal::Decimal;

/// Share of gross platform earnings kept after platform fees and fuel (85%).
pub const NET_RETENTION_FACTOR: Decimal = Decimal::from_parts(85, 0, 0, false, 2);

/// Largest absolute amount accepted for a single earnings row (one trillion).
pub const MAX_TRANSACTION_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Number of transaction rows written per storage call during an upload.
pub const TRANSACTION_BATCH_SIZE: usize = 1000;

/// Weeks in the observation window used by the stability score.
pub const TOTAL_WEEKS: u32 = 26;

/// Upper bound of the stability score scale.
pub const STABILITY_SCORE_MAX: u32 = 850;

/// Display name used on certificates when the worker has not set one.
pub const DEFAULT_WORKER_NAME: &str = "Gig Worker";
