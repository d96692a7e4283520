//! UTC calendar helpers without timezone dependencies.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current calendar year (UTC).
pub fn current_year() -> u16 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    year_from_unix_days((secs / 86_400) as i64)
}

/// Civil year for a count of days since 1970-01-01.
///
/// Uses the era-based days-to-civil conversion (400-year cycles of
/// 146097 days), so leap years need no lookup table.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn year_from_unix_days(days: i64) -> u16 {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    year as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_from_unix_days() {
        assert_eq!(year_from_unix_days(0), 1970);
        // 2000-02-29
        assert_eq!(year_from_unix_days(11_016), 2000);
        // 2023-12-31 and 2024-01-01
        assert_eq!(year_from_unix_days(19_722), 2023);
        assert_eq!(year_from_unix_days(19_723), 2024);
    }

    #[test]
    fn test_current_year_is_sane() {
        assert!(current_year() >= 2024);
    }
}
