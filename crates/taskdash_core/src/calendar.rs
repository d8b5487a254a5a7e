use crate::error::AppError;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Current calendar date in the local timezone, UTC when the offset is unknown.
pub fn today() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

pub fn parse_iso_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}

pub fn format_iso_date(date: Date) -> Result<String, AppError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{format_iso_date, parse_iso_date};
    use time::{Date, Month};

    #[test]
    fn parses_and_formats_iso_dates() {
        let date = parse_iso_date("2025-12-20").unwrap();
        assert_eq!(
            date,
            Date::from_calendar_date(2025, Month::December, 20).unwrap()
        );
        assert_eq!(format_iso_date(date).unwrap(), "2025-12-20");
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(
            parse_iso_date("20/12/2025").unwrap_err().code(),
            "invalid_input"
        );
        assert!(parse_iso_date("2025-02-30").is_err());
    }
}
