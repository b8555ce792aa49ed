//! Time helpers for the order window
//!
//! An order window is identified by its expiry date; it closes at the
//! configured cutoff time of day on that date. All expiry decisions go
//! through these helpers so the comparison is done in one place.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// The instant at which the window of `expiry_date` closes
pub fn expires_at(expiry_date: NaiveDate, cutoff: NaiveTime) -> NaiveDateTime {
    expiry_date.and_time(cutoff)
}

/// Whether the window of `expiry_date` has already closed (local time)
pub fn has_expired(expiry_date: NaiveDate, cutoff: NaiveTime) -> bool {
    Local::now().naive_local() > expires_at(expiry_date, cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn cutoff() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 30, 0).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2099-01-01").unwrap(),
            NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
        );
        assert!(parse_date("01.02.2099").is_err());
        assert!(parse_date("not a date").is_err());
    }

    #[test]
    fn test_past_date_has_expired() {
        assert!(has_expired(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), cutoff()));
    }

    #[test]
    fn test_future_date_has_not_expired() {
        assert!(!has_expired(NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(), cutoff()));
    }

    #[test]
    fn test_cutoff_decides_on_the_expiry_date_itself() {
        let now = Local::now().naive_local();
        let today = now.date();

        // A cutoff one hour away decides whether today's window is still open
        let one_hour_ahead = (now + Duration::hours(1)).time();
        let one_hour_ago = (now - Duration::hours(1)).time();

        if one_hour_ahead > now.time() {
            assert!(!has_expired(today, one_hour_ahead));
        }
        if one_hour_ago < now.time() {
            assert!(has_expired(today, one_hour_ago));
        }
    }
}
