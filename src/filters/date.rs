//! Inclusive UTC day-range filter
//!
//! The start bound is midnight of the start day; the end bound is the last
//! millisecond of the end day. The two pickers constrain each other so start
//! never passes end.

use chrono::{DateTime, NaiveDate};

use super::{Filter, FilterEvent};
use crate::constants::datetime::MILLIS_PER_DAY;
use crate::protocol::{ColumnInfo, FilterDescriptor};

#[derive(Debug, Clone)]
pub struct DateFilter {
    field: String,
    /// Earliest and latest timestamps reported by the host
    domain: Option<(i64, i64)>,
    start: Option<i64>,
    end: Option<i64>,
    has_multiple_values: bool,
}

/// Midnight UTC of the given day
pub fn day_start_ms(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// Last millisecond of the given day
pub fn day_end_ms(date: NaiveDate) -> i64 {
    day_start_ms(date) + MILLIS_PER_DAY - 1
}

/// UTC calendar day containing a timestamp
pub fn utc_date(ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

impl DateFilter {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            domain: None,
            start: None,
            end: None,
            has_multiple_values: true,
        }
    }

    pub fn domain(&self) -> Option<(i64, i64)> {
        self.domain
    }

    /// Committed bounds in UTC milliseconds, `None` where unset
    pub fn bounds(&self) -> (Option<i64>, Option<i64>) {
        (self.start, self.end)
    }

    /// Days shown in the two pickers
    pub fn picker_dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (min, max) = self.domain?;
        let start = utc_date(self.start.unwrap_or(min))?;
        let end = utc_date(self.end.unwrap_or(max))?;
        Some((start, end))
    }

    /// Selectable range for the start picker: domain start to the chosen end day
    pub fn start_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (min, _) = self.domain?;
        let (_, end) = self.picker_dates()?;
        Some((utc_date(min)?, end))
    }

    /// Selectable range for the end picker: the chosen start day to domain end
    pub fn end_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (_, max) = self.domain?;
        let (start, _) = self.picker_dates()?;
        Some((start, utc_date(max)?))
    }

    pub fn pick_start(&mut self, date: NaiveDate) -> Option<FilterEvent> {
        let (_, end) = self.picker_dates()?;
        let (lo, _) = self.start_bounds()?;
        let start = date.clamp(lo.min(end), end);
        self.commit(start, end);
        Some(FilterEvent::Changed(self.filter_info()))
    }

    pub fn pick_end(&mut self, date: NaiveDate) -> Option<FilterEvent> {
        let (start, _) = self.picker_dates()?;
        let (_, hi) = self.end_bounds()?;
        let end = date.clamp(start, hi.max(start));
        self.commit(start, end);
        Some(FilterEvent::Changed(self.filter_info()))
    }

    fn commit(&mut self, start: NaiveDate, end: NaiveDate) {
        let start_ms = day_start_ms(start);
        let end_ms = day_end_ms(end);
        match self.domain {
            Some((min, max)) => {
                self.start = (start_ms > min).then_some(start_ms);
                self.end = (end_ms < max).then_some(end_ms);
            }
            None => {
                self.start = Some(start_ms);
                self.end = Some(end_ms);
            }
        }
    }
}

impl Filter for DateFilter {
    fn field(&self) -> &str {
        &self.field
    }

    fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    fn filter_info(&self) -> FilterDescriptor {
        FilterDescriptor::Date {
            field: self.field.clone(),
            min: self.start,
            max: self.end,
        }
    }

    fn reset_filter(&mut self) {
        self.start = None;
        self.end = None;
    }

    fn update_min_max(&mut self, info: &ColumnInfo, _has_active_filter_elsewhere: bool) {
        if let (Some(min), Some(max)) = (info.filter_min, info.filter_max) {
            self.domain = Some((min, max));
            self.has_multiple_values = min != max;
        }
        if self.is_active() {
            return;
        }
        if let Some(FilterDescriptor::Date { min, max, .. }) = &info.filter_info {
            self.start = *min;
            self.end = *max;
        }
    }

    fn has_multiple_values(&self) -> bool {
        self.has_multiple_values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::datetime_to_wire;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filter_over(first: NaiveDate, last: NaiveDate) -> DateFilter {
        let mut filter = DateFilter::new("C");
        let mut info = ColumnInfo::new("C", crate::column::ColumnKind::Datetime);
        info.filter_min = Some(day_start_ms(first));
        info.filter_max = Some(day_start_ms(last) + 12 * 3_600_000);
        filter.update_min_max(&info, false);
        filter
    }

    #[test]
    fn test_end_of_day_boundary() {
        let mut filter = filter_over(date(2013, 1, 1), date(2013, 1, 31));
        filter.pick_end(date(2013, 1, 5)).unwrap();
        assert!(filter.is_active());

        let midnight = day_start_ms(date(2013, 1, 5));
        let end_of_day = midnight + MILLIS_PER_DAY - 1;
        assert_eq!(filter.bounds(), (None, Some(end_of_day)));

        let at = |ms: i64| json!(datetime_to_wire(ms).unwrap());
        assert!(filter.include_item(&at(midnight)));
        assert!(filter.include_item(&at(end_of_day)));
        assert!(!filter.include_item(&at(end_of_day + 1)));
    }

    #[test]
    fn test_full_range_is_inactive() {
        let mut filter = filter_over(date(2013, 1, 1), date(2013, 1, 31));
        filter.pick_start(date(2013, 1, 10)).unwrap();
        assert!(filter.is_active());
        filter.pick_start(date(2013, 1, 1)).unwrap();
        filter.pick_end(date(2013, 1, 31)).unwrap();
        assert!(!filter.is_active());
        assert_eq!(
            filter.filter_info(),
            FilterDescriptor::Date {
                field: "C".into(),
                min: None,
                max: None
            }
        );
    }

    #[test]
    fn test_pickers_cannot_cross() {
        let mut filter = filter_over(date(2013, 1, 1), date(2013, 1, 31));
        filter.pick_end(date(2013, 1, 10)).unwrap();
        filter.pick_start(date(2013, 1, 20)).unwrap();
        let (start, end) = filter.picker_dates().unwrap();
        assert_eq!(start, date(2013, 1, 10));
        assert_eq!(end, date(2013, 1, 10));

        filter.pick_end(date(2012, 12, 1)).unwrap();
        let (start, end) = filter.picker_dates().unwrap();
        assert!(start <= end);
    }

    #[test]
    fn test_without_domain_picks_are_ignored() {
        let mut filter = DateFilter::new("C");
        assert!(filter.pick_start(date(2013, 1, 1)).is_none());
        assert!(!filter.is_active());
    }
}
