//! Distinct-value filter for string and categorical columns
//!
//! The value list is itself windowed: the host sends a page `[value_range)` of
//! `length` sorted distinct values and the panel asks for more as it scrolls.
//! "Select all" is a host round trip because the full list may not be resident.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::debug;

use super::{Filter, FilterEvent};
use crate::column::ColumnKind;
use crate::constants::timing;
use crate::format::cell_text;
use crate::protocol::{ColumnInfo, FilterDescriptor, SelectAll, TextSelected};
use crate::schedule::Debounce;

/// Which distinct values pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TextSelection {
    #[default]
    Unfiltered,
    Only(BTreeSet<String>),
    AllExcept(BTreeSet<String>),
}

#[derive(Debug, Clone)]
pub struct TextFilter {
    field: String,
    /// Values come from the schema enum and are never paged
    categorical: bool,
    selection: TextSelection,
    /// Resident page of distinct values
    values: Vec<String>,
    value_range: (usize, usize),
    /// Distinct values in the current listing (search applied)
    length: usize,
    /// Distinct values in the column, as last confirmed without a search
    total_distinct: Option<usize>,
    search: String,
    search_timer: Debounce<String>,
    page_timer: Debounce<(usize, usize)>,
    has_multiple_values: bool,
}

impl TextFilter {
    pub fn new(field: &str, kind: ColumnKind) -> Self {
        Self {
            field: field.to_string(),
            categorical: kind == ColumnKind::Any,
            selection: TextSelection::Unfiltered,
            values: Vec::new(),
            value_range: (0, 0),
            length: 0,
            total_distinct: None,
            search: String::new(),
            search_timer: Debounce::new(timing::SEARCH_DEBOUNCE),
            page_timer: Debounce::new(timing::FILTER_VIEWPORT_DEBOUNCE),
            has_multiple_values: true,
        }
    }

    pub fn selection(&self) -> &TextSelection {
        &self.selection
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    /// Number of distinct values in the current listing
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Value at a listing position, if resident
    pub fn value_at(&self, index: usize) -> Option<&str> {
        let (top, bottom) = self.value_range;
        if index >= top && index < bottom {
            self.values.get(index - top).map(String::as_str)
        } else {
            None
        }
    }

    /// Resident values matching the search text, case-insensitively
    pub fn visible_values(&self) -> Vec<&str> {
        let needle = self.search.to_lowercase();
        self.values
            .iter()
            .filter(|v| needle.is_empty() || v.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    pub fn is_checked(&self, value: &str) -> bool {
        match &self.selection {
            TextSelection::Unfiltered => false,
            TextSelection::Only(values) => values.contains(value),
            TextSelection::AllExcept(excluded) => !excluded.contains(value),
        }
    }

    /// Check or uncheck one value. Commits immediately.
    pub fn toggle_value(&mut self, value: &str) -> FilterEvent {
        let flip = |set: &mut BTreeSet<String>| {
            if !set.remove(value) {
                set.insert(value.to_string());
            }
        };
        match &mut self.selection {
            TextSelection::Unfiltered => {
                self.selection = TextSelection::Only(BTreeSet::from([value.to_string()]));
            }
            TextSelection::Only(values) => {
                flip(values);
                if values.is_empty() {
                    self.selection = TextSelection::Unfiltered;
                }
            }
            TextSelection::AllExcept(excluded) => flip(excluded),
        }
        FilterEvent::Changed(self.filter_info())
    }

    /// Select every value, including ones not resident
    pub fn select_all(&mut self) -> FilterEvent {
        self.selection = TextSelection::AllExcept(BTreeSet::new());
        FilterEvent::Changed(self.filter_info())
    }

    /// Search box edited; the host is asked once typing settles
    pub fn set_search(&mut self, now: Duration, text: &str) {
        if text == self.search && !self.search_timer.is_pending() {
            return;
        }
        self.search = text.to_string();
        if self.search_timer.schedule(now, self.search.clone()) {
            debug!(field = %self.field, "search edit coalesced");
        }
    }

    /// Value list scrolled to `[top, bottom)`
    pub fn scroll_values(&mut self, now: Duration, top: usize, bottom: usize) {
        if self.categorical || self.page_timer.peek() == Some(&(top, bottom)) {
            return;
        }
        self.page_timer.schedule(now, (top, bottom));
    }

    /// Host answered a search or a page request
    pub fn update_value_page(&mut self, info: &ColumnInfo) {
        if let Some(values) = &info.values {
            self.values = values.iter().filter_map(cell_text).collect();
        }
        if let Some(length) = info.length {
            self.length = length;
        }
        self.value_range = info.value_range.unwrap_or((0, self.values.len()));
    }

    fn selection_from_descriptor(descriptor: &FilterDescriptor) -> Option<TextSelection> {
        match descriptor {
            FilterDescriptor::Text {
                selected: Some(TextSelected::Values(values)),
                ..
            } if !values.is_empty() => Some(TextSelection::Only(values.iter().cloned().collect())),
            FilterDescriptor::Text {
                selected: Some(TextSelected::All(_)),
                excluded,
                ..
            } => Some(TextSelection::AllExcept(
                excluded.iter().flatten().cloned().collect(),
            )),
            _ => None,
        }
    }
}

impl Filter for TextFilter {
    fn field(&self) -> &str {
        &self.field
    }

    /// An explicit selection covering every distinct value, and select-all
    /// with nothing excluded, both count as unfiltered.
    fn is_active(&self) -> bool {
        match &self.selection {
            TextSelection::Unfiltered => false,
            TextSelection::Only(values) => {
                !values.is_empty() && self.total_distinct != Some(values.len())
            }
            TextSelection::AllExcept(excluded) => !excluded.is_empty(),
        }
    }

    fn filter_info(&self) -> FilterDescriptor {
        let (selected, excluded) = match &self.selection {
            TextSelection::Only(values) if self.is_active() => (
                Some(TextSelected::Values(values.iter().cloned().collect())),
                None,
            ),
            TextSelection::AllExcept(excluded) => (
                Some(TextSelected::All(SelectAll::All)),
                Some(excluded.iter().cloned().collect()),
            ),
            _ => (None, None),
        };
        FilterDescriptor::Text {
            field: self.field.clone(),
            selected,
            excluded,
        }
    }

    fn reset_filter(&mut self) {
        self.selection = TextSelection::Unfiltered;
        self.search.clear();
        self.search_timer.cancel();
        self.page_timer.cancel();
    }

    fn update_min_max(&mut self, info: &ColumnInfo, _has_active_filter_elsewhere: bool) {
        let covered_all = matches!(self.selection, TextSelection::Only(_)) && !self.is_active();
        self.update_value_page(info);
        if self.search.is_empty() {
            self.total_distinct = info.length;
            self.has_multiple_values = self.length > 1;
        }
        // Every value was checked and the host holds no filter: values that
        // appear later stay included
        if covered_all && self.is_active() {
            self.selection = TextSelection::AllExcept(BTreeSet::new());
        }
        if self.selection != TextSelection::Unfiltered {
            return;
        }
        if let Some(selection) = info
            .filter_info
            .as_ref()
            .and_then(Self::selection_from_descriptor)
        {
            self.selection = selection;
        }
    }

    fn has_multiple_values(&self) -> bool {
        self.has_multiple_values
    }

    fn has_pending_edit(&self) -> bool {
        self.search_timer.is_pending()
    }

    fn poll(&mut self, now: Duration) -> Vec<FilterEvent> {
        let mut events = Vec::new();
        if let Some(search_val) = self.search_timer.poll(now) {
            events.push(FilterEvent::Search {
                field: self.field.clone(),
                search_val,
            });
        }
        if let Some((top, bottom)) = self.page_timer.poll(now) {
            events.push(FilterEvent::ValuePage {
                field: self.field.clone(),
                top,
                bottom,
            });
        }
        events
    }
}
