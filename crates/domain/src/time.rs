//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for cooldown deadlines, sample times, etc.
pub type Timestamp = DateTime<Utc>;

/// Longest duration any setting may hold: one year.
pub const MAX_SETTING_DURATION: std::time::Duration =
    std::time::Duration::from_secs(365 * 24 * 60 * 60);

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert a [`std::time::Duration`] into a [`chrono::Duration`], saturating
/// at the largest representable value.
#[must_use]
pub fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_convert_std_duration_to_chrono() {
        let d = to_chrono(std::time::Duration::from_secs(90));
        assert_eq!(d, chrono::Duration::seconds(90));
    }

    #[test]
    fn should_saturate_when_duration_is_out_of_range() {
        let d = to_chrono(std::time::Duration::MAX);
        assert_eq!(d, chrono::Duration::MAX);
        assert!(to_chrono(MAX_SETTING_DURATION) < chrono::Duration::MAX);
    }
}
