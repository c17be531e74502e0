use chrono::NaiveDate;
use kidsplay_game::Clock;

/// Today's date in the browser's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn today(&self) -> NaiveDate {
        let now = js_sys::Date::new_0();
        let (year, month, day) = (now.get_full_year(), now.get_month(), now.get_date());
        local_date(year, month, day).unwrap_or_else(|| {
            log::warn!("browser reported an invalid date {year}-{month}-{day}");
            NaiveDate::default()
        })
    }
}

/// Build a date from `Date` getters, whose month is zero-based.
#[must_use]
pub fn local_date(year: u32, month0: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month0 + 1, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_are_zero_based() {
        assert_eq!(
            local_date(2025, 6, 16),
            NaiveDate::from_ymd_opt(2025, 7, 16)
        );
        assert_eq!(local_date(2025, 11, 31), NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(local_date(2025, 1, 30), None);
    }
}
