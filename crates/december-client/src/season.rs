use chrono::Datelike;

/// Submissions open only in December.
pub fn is_december<D: Datelike>(date: &D) -> bool {
    date.month() == 12
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn only_month_twelve() {
        assert!(is_december(&NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()));
        assert!(is_december(&NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(!is_december(&NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
        assert!(!is_december(&NaiveDate::from_ymd_opt(2026, 11, 30).unwrap()));
    }
}
