//! Resolves canonical timezone names to UTC offsets.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the UTC offset that is currently in effect for `canonical_timezone`,
/// e.g. "Pacific/Auckland".
///
/// Returns [None] if the timezone name is not recognised.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

#[cfg(test)]
mod timezone_tests {
    use super::get_local_offset;

    #[test]
    fn resolves_canonical_timezone() {
        assert!(get_local_offset("Pacific/Auckland").is_some());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert_eq!(get_local_offset("Middle/Nowhere"), None);
    }
}
