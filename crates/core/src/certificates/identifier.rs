//! Certificate identifiers, verification hashes and derived display fields.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::Rng;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::platforms::Platform;
use crate::uploads::Transaction;

pub const CERTIFICATE_ID_PREFIX: &str = "KAM";

/// Largest value of the numeric id suffix (exclusive).
const ID_SUFFIX_SPACE: u32 = 100_000;

/// Number of fresh ids tried before issuance gives up on a collision.
pub const MAX_ID_ATTEMPTS: usize = 8;

/// Length of the verification hash shown on a certificate.
pub const VERIFICATION_HASH_LEN: usize = 16;

const PERIOD_MONTH_FORMAT: &str = "%B %Y";

/// Draws a new `KAM-<year>-<NNNNN>` identifier.
pub fn generate_certificate_id<R: Rng + ?Sized>(rng: &mut R, year: i32) -> String {
    format!(
        "{}-{}-{:05}",
        CERTIFICATE_ID_PREFIX,
        year,
        rng.gen_range(0..ID_SUFFIX_SPACE)
    )
}

/// Turns a user supplied id fragment into a full certificate id.
///
/// Accepts `2024-01234` as well as `KAM-2024-01234` (any case, surrounding
/// whitespace ignored). Returns `None` when the fragment cannot be an id.
pub fn normalize_certificate_id(fragment: &str) -> Option<String> {
    let upper = fragment.trim().to_ascii_uppercase();
    let suffix = upper
        .strip_prefix(CERTIFICATE_ID_PREFIX)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(&upper);

    let (year, number) = suffix.split_once('-')?;
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if year.len() == 4 && number.len() == 5 && all_digits(year) && all_digits(number) {
        Some(format!("{}-{}-{}", CERTIFICATE_ID_PREFIX, year, number))
    } else {
        None
    }
}

/// Computes the verification hash of a certificate.
///
/// SHA-256 over `id|user_id|total_net_income|stability_score|issued_at_millis`,
/// hex encoded and cut to [`VERIFICATION_HASH_LEN`] characters.
pub fn compute_verification_hash(
    certificate_id: &str,
    user_id: &str,
    total_net_income: Decimal,
    stability_score: u32,
    issued_at: &NaiveDateTime,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(certificate_id.as_bytes());
    hasher.update(b"|");
    hasher.update(user_id.as_bytes());
    hasher.update(b"|");
    // Trailing zeros would otherwise change the hash after a storage round trip
    hasher.update(total_net_income.normalize().to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(stability_score.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(issued_at.and_utc().timestamp_millis().to_string().as_bytes());

    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(VERIFICATION_HASH_LEN);
    digest
}

/// Earliest and latest transaction dates, ignoring undated rows.
pub fn date_span(transactions: &[Transaction]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = transactions.iter().filter_map(|t| t.transaction_date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Formats a certificate period such as "January 2024 - June 2024".
///
/// Falls back to the month of `today` on both sides when there is no span.
pub fn format_period(span: Option<(NaiveDate, NaiveDate)>, today: NaiveDate) -> String {
    let (start, end) = span.unwrap_or((today, today));
    format!(
        "{} - {}",
        start.format(PERIOD_MONTH_FORMAT),
        end.format(PERIOD_MONTH_FORMAT)
    )
}

/// Platforms in first-seen order, without duplicates.
pub fn distinct_platforms(transactions: &[Transaction]) -> Vec<Platform> {
    let mut platforms: Vec<Platform> = Vec::new();
    for transaction in transactions {
        if !platforms.contains(&transaction.platform) {
            platforms.push(transaction.platform);
        }
    }
    platforms
}

/// Year used in a newly drawn id.
pub(crate) fn id_year(issued_at: &NaiveDateTime) -> i32 {
    issued_at.date().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn tx(platform: Platform, date: Option<(i32, u32, u32)>) -> Transaction {
        Transaction {
            id: "tx".to_string(),
            user_id: "user-1".to_string(),
            upload_id: "upload-1".to_string(),
            platform,
            amount: dec!(100),
            transaction_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            trip_id: None,
            raw_data: BTreeMap::new(),
        }
    }

    fn issued_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_generated_id_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let id = generate_certificate_id(&mut rng, 2024);
            assert!(id.starts_with("KAM-2024-"));
            assert_eq!(id.len(), "KAM-2024-00000".len());
            assert_eq!(normalize_certificate_id(&id), Some(id.clone()));
        }
    }

    #[test]
    fn test_normalize_accepts_suffix_and_full_id() {
        assert_eq!(
            normalize_certificate_id("2024-01234").as_deref(),
            Some("KAM-2024-01234")
        );
        assert_eq!(
            normalize_certificate_id(" kam-2024-01234 ").as_deref(),
            Some("KAM-2024-01234")
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize_certificate_id(""), None);
        assert_eq!(normalize_certificate_id("sample"), None);
        assert_eq!(normalize_certificate_id("2024-1234"), None);
        assert_eq!(normalize_certificate_id("KAM-24-01234"), None);
        assert_eq!(normalize_certificate_id("KAM-2024-0123a"), None);
        assert_eq!(normalize_certificate_id("XYZ-2024-01234"), None);
    }

    #[test]
    fn test_hash_is_stable_and_truncated() {
        let a = compute_verification_hash("KAM-2024-00001", "user-1", dec!(680.00), 425, &issued_at());
        let b = compute_verification_hash("KAM-2024-00001", "user-1", dec!(680), 425, &issued_at());

        assert_eq!(a.len(), VERIFICATION_HASH_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_changes_with_inputs() {
        let base = compute_verification_hash("KAM-2024-00001", "user-1", dec!(680), 425, &issued_at());

        assert_ne!(
            base,
            compute_verification_hash("KAM-2024-00002", "user-1", dec!(680), 425, &issued_at())
        );
        assert_ne!(
            base,
            compute_verification_hash("KAM-2024-00001", "user-2", dec!(680), 425, &issued_at())
        );
        assert_ne!(
            base,
            compute_verification_hash("KAM-2024-00001", "user-1", dec!(681), 425, &issued_at())
        );
        assert_ne!(
            base,
            compute_verification_hash("KAM-2024-00001", "user-1", dec!(680), 426, &issued_at())
        );
    }

    #[test]
    fn test_period_spans_dated_transactions() {
        let transactions = vec![
            tx(Platform::Uber, Some((2024, 3, 10))),
            tx(Platform::Uber, None),
            tx(Platform::Swiggy, Some((2023, 11, 2))),
            tx(Platform::Uber, Some((2024, 6, 30))),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        let span = date_span(&transactions);
        assert_eq!(
            span,
            Some((
                NaiveDate::from_ymd_opt(2023, 11, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
            ))
        );
        assert_eq!(format_period(span, today), "November 2023 - June 2024");
    }

    #[test]
    fn test_period_falls_back_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let span = date_span(&[tx(Platform::Uber, None)]);

        assert_eq!(span, None);
        assert_eq!(format_period(span, today), "July 2024 - July 2024");
    }

    #[test]
    fn test_distinct_platforms_keep_first_seen_order() {
        let transactions = vec![
            tx(Platform::Zomato, None),
            tx(Platform::Uber, None),
            tx(Platform::Zomato, None),
            tx(Platform::Swiggy, None),
            tx(Platform::Uber, None),
        ];

        assert_eq!(
            distinct_platforms(&transactions),
            vec![Platform::Zomato, Platform::Uber, Platform::Swiggy]
        );
    }
}
