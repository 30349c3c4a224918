//! Per-column filters
//!
//! Each filter owns its bounds or selection, syncs its value domain from host
//! statistics and reports committed changes as `FilterEvent`s. Interactive
//! edits that need coalescing go through a `Debounce` and surface from `poll`.

pub mod boolean;
pub mod date;
pub mod panel;
pub mod predicate;
pub mod slider;
pub mod text;

use std::time::Duration;

use serde_json::Value;

use crate::column::{Column, FilterKind};
use crate::protocol::{ClientMessage, ColumnInfo, FilterDescriptor};

pub use boolean::BooleanFilter;
pub use date::DateFilter;
pub use panel::{DocumentEvent, FilterPanelSlot, PanelContent, PointerTarget};
pub use predicate::Predicate;
pub use slider::SliderFilter;
pub use text::{TextFilter, TextSelection};

/// Something a filter wants sent to the host
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent {
    /// A committed filter change
    Changed(FilterDescriptor),
    /// Settled search text for the distinct-value list
    Search { field: String, search_val: String },
    /// Settled scroll position of the distinct-value list
    ValuePage {
        field: String,
        top: usize,
        bottom: usize,
    },
}

impl FilterEvent {
    pub fn into_message(self) -> ClientMessage {
        match self {
            FilterEvent::Changed(filter_info) => ClientMessage::ChangeFilter {
                field: filter_info.field().to_string(),
                filter_info,
            },
            FilterEvent::Search { field, search_val } => ClientMessage::GetColumnMinMax {
                field,
                search_val: Some(search_val),
            },
            FilterEvent::ValuePage { field, top, bottom } => {
                ClientMessage::ChangeViewportFilter { field, top, bottom }
            }
        }
    }
}

/// Contract every filter variant implements
pub trait Filter {
    fn field(&self) -> &str;

    /// True iff committed state restricts rows
    fn is_active(&self) -> bool;

    fn filter_info(&self) -> FilterDescriptor;

    /// Back to "include everything". Idempotent.
    fn reset_filter(&mut self);

    /// Re-sync the known value domain. Never overrides an active selection.
    fn update_min_max(&mut self, info: &ColumnInfo, has_active_filter_elsewhere: bool);

    /// False when every row holds the same value
    fn has_multiple_values(&self) -> bool;

    /// An edit is waiting for its debounce window
    fn has_pending_edit(&self) -> bool {
        false
    }

    /// Fire any debounced action whose window has elapsed
    fn poll(&mut self, _now: Duration) -> Vec<FilterEvent> {
        Vec::new()
    }

    fn include_item(&self, value: &Value) -> bool {
        Predicate::from_descriptor(&self.filter_info()).matches(value)
    }
}

/// The filter instance attached to one column
#[derive(Debug, Clone)]
pub enum ColumnFilter {
    Text(TextFilter),
    Slider(SliderFilter),
    Date(DateFilter),
    Boolean(BooleanFilter),
}

impl ColumnFilter {
    /// Build the filter a column's kind calls for
    pub fn for_column(column: &Column) -> Option<Self> {
        let field = column.field();
        let kind = column.filter?;
        Some(match kind {
            FilterKind::Text => ColumnFilter::Text(TextFilter::new(field, column.kind())),
            FilterKind::Slider => ColumnFilter::Slider(SliderFilter::new(field, column.kind())),
            FilterKind::Date => ColumnFilter::Date(DateFilter::new(field)),
            FilterKind::Boolean => ColumnFilter::Boolean(BooleanFilter::new(field)),
        })
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            ColumnFilter::Text(_) => FilterKind::Text,
            ColumnFilter::Slider(_) => FilterKind::Slider,
            ColumnFilter::Date(_) => FilterKind::Date,
            ColumnFilter::Boolean(_) => FilterKind::Boolean,
        }
    }

    fn as_filter(&self) -> &dyn Filter {
        match self {
            ColumnFilter::Text(f) => f,
            ColumnFilter::Slider(f) => f,
            ColumnFilter::Date(f) => f,
            ColumnFilter::Boolean(f) => f,
        }
    }

    fn as_filter_mut(&mut self) -> &mut dyn Filter {
        match self {
            ColumnFilter::Text(f) => f,
            ColumnFilter::Slider(f) => f,
            ColumnFilter::Date(f) => f,
            ColumnFilter::Boolean(f) => f,
        }
    }

    /// Show the "nothing to filter" notice instead of controls
    pub fn is_degenerate(&self) -> bool {
        !self.has_multiple_values() && !self.is_active()
    }
}

impl Filter for ColumnFilter {
    fn field(&self) -> &str {
        self.as_filter().field()
    }

    fn is_active(&self) -> bool {
        self.as_filter().is_active()
    }

    fn filter_info(&self) -> FilterDescriptor {
        self.as_filter().filter_info()
    }

    fn reset_filter(&mut self) {
        self.as_filter_mut().reset_filter()
    }

    fn update_min_max(&mut self, info: &ColumnInfo, has_active_filter_elsewhere: bool) {
        self.as_filter_mut()
            .update_min_max(info, has_active_filter_elsewhere)
    }

    fn has_multiple_values(&self) -> bool {
        self.as_filter().has_multiple_values()
    }

    fn has_pending_edit(&self) -> bool {
        self.as_filter().has_pending_edit()
    }

    fn poll(&mut self, now: Duration) -> Vec<FilterEvent> {
        self.as_filter_mut().poll(now)
    }

    fn include_item(&self, value: &Value) -> bool {
        self.as_filter().include_item(value)
    }
}
