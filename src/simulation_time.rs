use crate::core::units::{DAYS_IN_MONTH, DAYS_PER_WEEK, HOURS_PER_DAY, HOURS_PER_YEAR, MONTHS_PER_YEAR};

// # Define hours that start each month (and end next month). Note there are 13
// # values so that end of final month is handled correctly.
// # E.g. Jan is hours 0-743
pub(crate) const MONTH_START_END_HOURS: [usize; 13] = [
    0, 744, 1416, 2160, 2880, 3624, 4344, 5088, 5832, 6552, 7296, 8016, 8760,
];

/// Calendar position of one hour of the representative (non-leap) year.
///
/// The year starts on day-of-week 0, and days of the week cycle 0..=6 from there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarEntry {
    /// 0 to 23
    pub hour_of_day: u32,
    /// 0 to 6
    pub day_of_week: u32,
    /// 1 to 31
    pub day_of_month: u32,
    /// 1 to 12
    pub month: u32,
    /// 0 to 364
    pub day_of_year: u32,
}

/// Lookup from hour-of-year (0 to 8759) to calendar position, computed once.
#[derive(Clone, Debug)]
pub struct TimeFrame {
    entries: Vec<CalendarEntry>,
}

impl TimeFrame {
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(HOURS_PER_YEAR);
        let mut day_of_year = 0;

        for (month_idx, days) in DAYS_IN_MONTH.iter().enumerate() {
            for day_of_month in 1..=*days {
                for hour_of_day in 0..HOURS_PER_DAY {
                    entries.push(CalendarEntry {
                        hour_of_day,
                        day_of_week: day_of_year % DAYS_PER_WEEK,
                        day_of_month,
                        month: month_idx as u32 + 1,
                        day_of_year,
                    });
                }
                day_of_year += 1;
            }
        }

        Self { entries }
    }

    pub fn entry(&self, hour_of_year: usize) -> &CalendarEntry {
        &self.entries[hour_of_year]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalendarEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of days in a month, where month is 1 to 12
    pub fn month_length(month: u32) -> u32 {
        DAYS_IN_MONTH[(month - 1) as usize]
    }

    /// First hour of the month and first hour of the following month, where month_idx is 0 to 11
    pub fn month_start_end_hours(month_idx: usize) -> (usize, usize) {
        (
            MONTH_START_END_HOURS[month_idx],
            MONTH_START_END_HOURS[month_idx + 1],
        )
    }
}

impl Default for TimeFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Sum an hourly series into 12 monthly buckets using the fixed month boundaries.
pub fn sum_hours_by_month(hourly: &[f64]) -> [f64; MONTHS_PER_YEAR] {
    let mut monthly = [0.0; MONTHS_PER_YEAR];
    for (month_idx, total) in monthly.iter_mut().enumerate() {
        let (start, end) = TimeFrame::month_start_end_hours(month_idx);
        *total = hourly[start..end].iter().sum();
    }
    monthly
}
