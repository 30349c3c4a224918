//! Numeric range filter

use std::time::Duration;

use tracing::debug;

use super::{Filter, FilterEvent};
use crate::column::ColumnKind;
use crate::constants::{layout, timing};
use crate::protocol::{ColumnInfo, FilterDescriptor};
use crate::schedule::Debounce;

#[derive(Debug, Clone)]
pub struct SliderFilter {
    field: String,
    integer: bool,
    /// Domain reported by the host
    domain: Option<(f64, f64)>,
    /// Committed bounds; `None` means the bound is at the domain extreme
    lower: Option<f64>,
    upper: Option<f64>,
    drag: Debounce<(f64, f64)>,
    has_multiple_values: bool,
}

impl SliderFilter {
    pub fn new(field: &str, kind: ColumnKind) -> Self {
        Self {
            field: field.to_string(),
            integer: kind == ColumnKind::Integer,
            domain: None,
            lower: None,
            upper: None,
            drag: Debounce::new(timing::SLIDER_DEBOUNCE),
            has_multiple_values: true,
        }
    }

    pub fn domain(&self) -> Option<(f64, f64)> {
        self.domain
    }

    pub fn step(&self) -> f64 {
        match (self.integer, self.domain) {
            (true, _) => 1.0,
            (false, Some((min, max))) => (max - min) / layout::SLIDER_STEPS,
            (false, None) => 1.0,
        }
    }

    /// Handle positions to draw: pending drag if any, else committed bounds
    /// with unset ends pinned to the domain
    pub fn handle_positions(&self) -> Option<(f64, f64)> {
        if let Some(&pending) = self.drag.peek() {
            return Some(pending);
        }
        let (min, max) = self.domain?;
        Some((self.lower.unwrap_or(min), self.upper.unwrap_or(max)))
    }

    /// Committed bounds, `None` where unset
    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        (self.lower, self.upper)
    }

    /// Slider dragged; committed once the drag settles
    pub fn slide(&mut self, now: Duration, lower: f64, upper: f64) {
        let (lower, upper) = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };
        if self.drag.schedule(now, (lower, upper)) {
            debug!(field = %self.field, "slider edit coalesced");
        }
    }

    fn commit(&mut self, lower: f64, upper: f64) {
        let (lower, upper) = if self.integer {
            (lower.round(), upper.round())
        } else {
            (lower, upper)
        };
        match self.domain {
            Some((min, max)) => {
                let lower = lower.clamp(min, max);
                let upper = upper.clamp(min, max);
                self.lower = (lower != min).then_some(lower);
                self.upper = (upper != max).then_some(upper);
            }
            None => {
                self.lower = Some(lower);
                self.upper = Some(upper);
            }
        }
    }
}

impl Filter for SliderFilter {
    fn field(&self) -> &str {
        &self.field
    }

    fn is_active(&self) -> bool {
        self.lower.is_some() || self.upper.is_some()
    }

    fn filter_info(&self) -> FilterDescriptor {
        FilterDescriptor::Slider {
            field: self.field.clone(),
            min: self.lower,
            max: self.upper,
        }
    }

    fn reset_filter(&mut self) {
        self.drag.cancel();
        self.lower = None;
        self.upper = None;
    }

    fn update_min_max(&mut self, info: &ColumnInfo, _has_active_filter_elsewhere: bool) {
        if let (Some(min), Some(max)) = (info.slider_min, info.slider_max) {
            self.domain = Some((min, max));
            self.has_multiple_values = min != max;
        }
        if self.is_active() || self.drag.is_pending() {
            return;
        }
        // inactive: take the host's committed state, if it has one
        if let Some(FilterDescriptor::Slider { min, max, .. }) = &info.filter_info {
            if min.is_some() || max.is_some() {
                let (dmin, dmax) = self.domain.unwrap_or((f64::MIN, f64::MAX));
                self.commit(min.unwrap_or(dmin), max.unwrap_or(dmax));
            }
        }
    }

    fn has_multiple_values(&self) -> bool {
        self.has_multiple_values
    }

    fn has_pending_edit(&self) -> bool {
        self.drag.is_pending()
    }

    fn poll(&mut self, now: Duration) -> Vec<FilterEvent> {
        match self.drag.poll(now) {
            Some((lower, upper)) => {
                self.commit(lower, upper);
                vec![FilterEvent::Changed(self.filter_info())]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Clock, ManualClock};
    use serde_json::json;

    fn integer_filter(min: f64, max: f64) -> SliderFilter {
        let mut filter = SliderFilter::new("A", ColumnKind::Integer);
        let mut info = ColumnInfo::new("A", ColumnKind::Integer);
        info.slider_min = Some(min);
        info.slider_max = Some(max);
        filter.update_min_max(&info, false);
        filter
    }

    fn committed(filter: &mut SliderFilter, clock: &ManualClock) -> Vec<FilterEvent> {
        clock.advance_ms(100);
        filter.poll(clock.now())
    }

    #[test]
    fn test_drag_inside_then_to_full_domain() {
        let clock = ManualClock::new();
        let mut filter = integer_filter(0.0, 100.0);

        filter.slide(clock.now(), 20.0, 80.0);
        assert!(!filter.is_active());
        assert!(filter.has_pending_edit());
        let events = committed(&mut filter, &clock);
        assert_eq!(events.len(), 1);
        assert!(filter.is_active());
        assert_eq!(
            filter.filter_info(),
            FilterDescriptor::Slider {
                field: "A".into(),
                min: Some(20.0),
                max: Some(80.0)
            }
        );
        assert!(filter.include_item(&json!(50)));
        assert!(!filter.include_item(&json!(81)));

        filter.slide(clock.now(), 0.0, 100.0);
        committed(&mut filter, &clock);
        assert!(!filter.is_active());
        assert_eq!(filter.bounds(), (None, None));
    }

    #[test]
    fn test_rapid_drags_commit_once() {
        let clock = ManualClock::new();
        let mut filter = integer_filter(0.0, 100.0);
        for i in 0..10 {
            filter.slide(clock.now(), i as f64, 90.0);
            clock.advance_ms(10);
        }
        assert!(filter.poll(clock.now()).is_empty());
        let events = committed(&mut filter, &clock);
        assert_eq!(events.len(), 1);
        assert_eq!(filter.bounds(), (Some(9.0), Some(90.0)));
        assert!(committed(&mut filter, &clock).is_empty());
    }

    #[test]
    fn test_domain_update_keeps_active_bounds() {
        let clock = ManualClock::new();
        let mut filter = integer_filter(0.0, 100.0);
        filter.slide(clock.now(), 20.0, 80.0);
        committed(&mut filter, &clock);

        let mut info = ColumnInfo::new("A", ColumnKind::Integer);
        info.slider_min = Some(30.0);
        info.slider_max = Some(60.0);
        filter.update_min_max(&info, true);
        assert_eq!(filter.bounds(), (Some(20.0), Some(80.0)));
        assert_eq!(filter.domain(), Some((30.0, 60.0)));
    }

    #[test]
    fn test_step_and_degenerate() {
        let filter = integer_filter(5.0, 5.0);
        assert!(!filter.has_multiple_values());
        assert_eq!(filter.step(), 1.0);

        let mut float = SliderFilter::new("B", ColumnKind::Number);
        let mut info = ColumnInfo::new("B", ColumnKind::Number);
        info.slider_min = Some(0.0);
        info.slider_max = Some(2.0);
        float.update_min_max(&info, false);
        assert_eq!(float.step(), 0.01);
        assert_eq!(float.handle_positions(), Some((0.0, 2.0)));
    }

    #[test]
    fn test_adopts_host_filter_when_inactive() {
        let mut filter = SliderFilter::new("A", ColumnKind::Integer);
        let mut info = ColumnInfo::new("A", ColumnKind::Integer);
        info.slider_min = Some(0.0);
        info.slider_max = Some(100.0);
        info.filter_info = Some(FilterDescriptor::Slider {
            field: "A".into(),
            min: Some(10.0),
            max: None,
        });
        filter.update_min_max(&info, false);
        assert_eq!(filter.bounds(), (Some(10.0), None));
    }

    #[test]
    fn test_reset_cancels_pending_drag() {
        let clock = ManualClock::new();
        let mut filter = integer_filter(0.0, 100.0);
        filter.slide(clock.now(), 10.0, 20.0);
        filter.reset_filter();
        assert!(committed(&mut filter, &clock).is_empty());
        assert!(!filter.is_active());
    }
}
