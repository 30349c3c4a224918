//! True/false/unset filter. Changes commit immediately.

use serde_json::Value;

use super::{Filter, FilterEvent};
use crate::protocol::{ColumnInfo, FilterDescriptor};

#[derive(Debug, Clone)]
pub struct BooleanFilter {
    field: String,
    selected: Option<bool>,
    /// Which of true/false occur in the column
    values: Vec<bool>,
    has_multiple_values: bool,
}

impl BooleanFilter {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            selected: None,
            values: Vec::new(),
            has_multiple_values: true,
        }
    }

    pub fn selected(&self) -> Option<bool> {
        self.selected
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    /// Radio choice changed; emits only when the choice differs
    pub fn select(&mut self, selected: Option<bool>) -> Option<FilterEvent> {
        if self.selected == selected {
            return None;
        }
        self.selected = selected;
        Some(FilterEvent::Changed(self.filter_info()))
    }
}

impl Filter for BooleanFilter {
    fn field(&self) -> &str {
        &self.field
    }

    fn is_active(&self) -> bool {
        self.selected.is_some()
    }

    fn filter_info(&self) -> FilterDescriptor {
        FilterDescriptor::Boolean {
            field: self.field.clone(),
            selected: self.selected,
        }
    }

    fn reset_filter(&mut self) {
        self.selected = None;
    }

    fn update_min_max(&mut self, info: &ColumnInfo, _has_active_filter_elsewhere: bool) {
        if let Some(values) = &info.values {
            self.values = values.iter().filter_map(Value::as_bool).collect();
            self.has_multiple_values = self.values.len() > 1;
        }
        if self.is_active() {
            return;
        }
        if let Some(FilterDescriptor::Boolean { selected, .. }) = &info.filter_info {
            self.selected = *selected;
        }
    }

    fn has_multiple_values(&self) -> bool {
        self.has_multiple_values
    }
}
