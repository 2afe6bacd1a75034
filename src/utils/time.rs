use crate::error::{Error, Result};
use chrono::{NaiveDate, Utc};

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parses a `YYYY-MM-DD` calendar date as sent by the daily-challenge client.
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| Error::BadRequest(format!("Invalid date: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let day = parse_day("2024-03-15").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert!(parse_day("2024-3-15x").is_err());
        assert!(parse_day("15/03/2024").is_err());
    }
}
