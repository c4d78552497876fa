//! Fiscal calendar for the fund.
//!
//! The fund has an inception month; nothing before it is ever reported. All
//! "which month is it" questions are answered in the fund's configured UTC
//! offset rather than the server's local zone.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};

use super::models::MonthKey;

/// The set of months a report covers.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthWindow {
    /// Most recent first
    pub month_keys: Vec<MonthKey>,
    /// Most recent first
    pub available_years: Vec<i32>,
    pub selected_year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiscalCalendar {
    inception: MonthKey,
    offset: FixedOffset,
}

impl FiscalCalendar {
    pub fn new(inception: MonthKey, offset: FixedOffset) -> Self {
        Self { inception, offset }
    }

    pub fn inception(&self) -> MonthKey {
        self.inception
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Today's date in the fund's offset
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Month keys of `year`, most recent first, clipped to inception and to `today`
    pub fn month_keys(&self, year: i32, today: NaiveDate) -> Vec<MonthKey> {
        if year < self.inception.year() || year > today.year() {
            return Vec::new();
        }

        let last = if year == today.year() { today.month() } else { 12 };
        let first = if year == self.inception.year() {
            self.inception.month()
        } else {
            1
        };

        (first..=last)
            .rev()
            .filter_map(|month| MonthKey::new(year, month))
            .collect()
    }

    /// Current year down to the inception year
    pub fn available_years(&self, today: NaiveDate) -> Vec<i32> {
        (self.inception.year()..=today.year()).rev().collect()
    }

    /// The requested year when it is reportable, otherwise the most recent one
    pub fn resolve_year(&self, requested: Option<i32>, today: NaiveDate) -> i32 {
        let available = self.available_years(today);
        match requested {
            Some(year) if available.contains(&year) => year,
            _ => available.first().copied().unwrap_or(self.inception.year()),
        }
    }

    pub fn window(&self, requested: Option<i32>, today: NaiveDate) -> MonthWindow {
        let selected_year = self.resolve_year(requested, today);
        MonthWindow {
            month_keys: self.month_keys(selected_year, today),
            available_years: self.available_years(today),
            selected_year,
        }
    }

    /// UTC instants `[start, end)` bounding `year` in the fund's offset
    pub fn year_bounds(&self, year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.local_midnight(year, 1, 1)?;
        let end = self.local_midnight(year.checked_add(1)?, 1, 1)?;
        Some((start, end))
    }

    /// The local month `instant` falls in
    pub fn month_of(&self, instant: DateTime<Utc>) -> Option<MonthKey> {
        let local = instant.with_timezone(&self.offset);
        MonthKey::new(local.year(), local.month())
    }

    fn local_midnight(&self, year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> FiscalCalendar {
        FiscalCalendar::new(
            MonthKey::parse("2025-10").unwrap(),
            FixedOffset::east_opt(9 * 3600).unwrap(),
        )
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn keys(keys: &[MonthKey]) -> Vec<String> {
        keys.iter().map(|key| key.to_string()).collect()
    }

    #[test]
    fn test_inception_year_is_clipped_to_inception_month() {
        let calendar = calendar();
        let window = calendar.month_keys(2025, date(2026, 3, 14));
        assert_eq!(keys(&window), vec!["2025-12", "2025-11", "2025-10"]);
    }

    #[test]
    fn test_current_year_stops_at_current_month() {
        let calendar = calendar();
        let window = calendar.month_keys(2026, date(2026, 3, 14));
        assert_eq!(keys(&window), vec!["2026-03", "2026-02", "2026-01"]);
    }

    #[test]
    fn test_years_outside_range_are_empty() {
        let calendar = calendar();
        assert!(calendar.month_keys(2024, date(2026, 3, 14)).is_empty());
        assert!(calendar.month_keys(2027, date(2026, 3, 14)).is_empty());
        // Clock before inception inside the inception year
        assert!(calendar.month_keys(2025, date(2025, 8, 1)).is_empty());
    }

    #[test]
    fn test_months_before_inception_never_appear() {
        let calendar = calendar();
        let inception = calendar.inception();
        for year in 2020..=2030 {
            for key in calendar.month_keys(year, date(2030, 6, 1)) {
                assert!(key >= inception, "{} precedes inception", key);
            }
        }
    }

    #[test]
    fn test_available_years_and_resolution() {
        let calendar = calendar();
        let today = date(2027, 1, 5);
        assert_eq!(calendar.available_years(today), vec![2027, 2026, 2025]);
        assert_eq!(calendar.resolve_year(Some(2026), today), 2026);
        assert_eq!(calendar.resolve_year(Some(2019), today), 2027);
        assert_eq!(calendar.resolve_year(None, today), 2027);

        // Before inception the inception year is still selectable
        assert_eq!(calendar.resolve_year(None, date(2024, 6, 1)), 2025);
    }

    #[test]
    fn test_window_combines_resolution_and_keys() {
        let window = calendar().window(Some(1999), date(2025, 11, 2));
        assert_eq!(window.selected_year, 2025);
        assert_eq!(window.available_years, vec![2025]);
        assert_eq!(keys(&window.month_keys), vec!["2025-11", "2025-10"]);
    }

    #[test]
    fn test_year_bounds_and_month_of_use_fund_offset() {
        let calendar = calendar();
        let (start, end) = calendar.year_bounds(2026).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 31, 15, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 12, 31, 15, 0, 0).unwrap());

        // 16:00 UTC on Dec 31 is already January in +09:00
        let instant = Utc.with_ymd_and_hms(2025, 12, 31, 16, 0, 0).unwrap();
        assert_eq!(calendar.month_of(instant).unwrap().to_string(), "2026-01");
    }
}
