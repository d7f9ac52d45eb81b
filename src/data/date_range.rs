use crate::engine::error::DataError;
use chrono::NaiveDate;

//minimum span accepted for a backtest window
pub const MIN_RANGE_DAYS: i64 = 30;

//checks a requested backtest window
//today is passed in so the check stays deterministic
pub fn validate_date_range(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<(), DataError> {
    if start >= end {
        return Err(DataError::InvalidDateRange(
            "Start date must be before end date".to_string(),
        ));
    }

    if (end - start).num_days() < MIN_RANGE_DAYS {
        return Err(DataError::InvalidDateRange(
            "Date range must be at least 30 days".to_string(),
        ));
    }

    if end > today {
        return Err(DataError::InvalidDateRange(
            "End date cannot be in the future".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn one_year_window_is_valid() {
        assert!(validate_date_range(d(2023, 1, 1), d(2024, 1, 1), d(2024, 6, 1)).is_ok());
    }

    #[test]
    fn start_after_end_is_rejected() {
        let err = validate_date_range(d(2024, 1, 1), d(2023, 1, 1), d(2024, 6, 1)).unwrap_err();
        assert_eq!(err.to_string(), "Start date must be before end date");
    }

    #[test]
    fn short_window_is_rejected() {
        let err = validate_date_range(d(2024, 1, 1), d(2024, 1, 15), d(2024, 6, 1)).unwrap_err();
        assert_eq!(err.to_string(), "Date range must be at least 30 days");
    }

    #[test]
    fn exactly_thirty_days_is_accepted() {
        assert!(validate_date_range(d(2024, 1, 1), d(2024, 1, 31), d(2024, 6, 1)).is_ok());
    }

    #[test]
    fn future_end_is_rejected() {
        let err = validate_date_range(d(2024, 1, 1), d(2024, 7, 1), d(2024, 6, 1)).unwrap_err();
        assert_eq!(err.to_string(), "End date cannot be in the future");
    }
}
