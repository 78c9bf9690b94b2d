use super::Platform;

/// Detects the gig platform from a CSV header row.
///
/// The headers are joined and lowercased, then each platform's keywords are
/// searched for as substrings in priority order (Swiggy, Zomato, Uber, Rapido,
/// UrbanClap). The first hit wins, so a header set mentioning several
/// platforms resolves to the earliest one. No hit yields `Platform::Unknown`.
pub fn detect_platform(headers: &[String]) -> Platform {
    let haystack = headers.join(" ").to_lowercase();

    Platform::ALL
        .into_iter()
        .find(|platform| {
            platform
                .keywords()
                .iter()
                .any(|keyword| haystack.contains(keyword))
        })
        .unwrap_or(Platform::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn headers(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_detects_each_platform() {
        assert_eq!(
            detect_platform(&headers(&["Swiggy Order ID", "Amount"])),
            Platform::Swiggy
        );
        assert_eq!(
            detect_platform(&headers(&["zomato_payout", "date"])),
            Platform::Zomato
        );
        assert_eq!(detect_platform(&headers(&["UBER trip", "fare"])), Platform::Uber);
        assert_eq!(detect_platform(&headers(&["rapido_ride"])), Platform::Rapido);
        assert_eq!(
            detect_platform(&headers(&["UrbanClap Job", "Payout"])),
            Platform::UrbanClap
        );
        assert_eq!(
            detect_platform(&headers(&["urban company booking"])),
            Platform::UrbanClap
        );
    }

    #[test]
    fn test_unknown_when_no_keyword() {
        assert_eq!(
            detect_platform(&headers(&["order_id", "amount", "date"])),
            Platform::Unknown
        );
        assert_eq!(detect_platform(&[]), Platform::Unknown);
    }

    #[test]
    fn test_first_platform_in_priority_order_wins() {
        assert_eq!(
            detect_platform(&headers(&["uber_fare", "zomato_tip", "swiggy_bonus"])),
            Platform::Swiggy
        );
        assert_eq!(
            detect_platform(&headers(&["rapido", "zomato"])),
            Platform::Zomato
        );
    }

    proptest! {
        #[test]
        fn prop_swiggy_keyword_always_detected(
            prefix in "[a-z_ ]{0,12}",
            suffix in "[a-z_ ]{0,12}",
            upper in any::<bool>(),
            other in proptest::collection::vec("[a-z_]{0,10}", 0..5),
        ) {
            let keyword = if upper { "SWIGGY" } else { "Swiggy" };
            let mut cols = other;
            cols.push(format!("{prefix}{keyword}{suffix}"));
            prop_assert_eq!(detect_platform(&cols), Platform::Swiggy);
        }
    }
}
