use chrono::{DateTime, Locale, TimeZone, Utc};

/// Viewer-facing date: day, full month name, year in `locale`, taken in the
/// viewer's time zone.
pub fn format_date<Tz: TimeZone>(created_at: DateTime<Utc>, tz: &Tz, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    created_at
        .with_timezone(tz)
        .format_localized("%-d %B %Y", locale)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn indonesian_month_names() {
        let at = Utc.with_ymd_and_hms(2025, 12, 24, 10, 0, 0).unwrap();
        assert_eq!(format_date(at, &Utc, Locale::id_ID), "24 Desember 2025");
    }

    #[test]
    fn other_locales() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap();
        assert_eq!(format_date(at, &Utc, Locale::en_US), "19 October 2026");
    }

    #[test]
    fn uses_viewer_time_zone() {
        // 20:00 UTC on Dec 31 is already Jan 1 in Jakarta (UTC+7).
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 20, 0, 0).unwrap();
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(format_date(at, &jakarta, Locale::id_ID), "1 Januari 2026");
    }
}
