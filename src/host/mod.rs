//! Reference host
//!
//! Answers `ClientMessage`s from an in-memory `DataSet`: filtering with the
//! shared predicates, stable sorting, paging around the requested viewport,
//! distinct-value tables for text filters and row mutation. Failures become
//! `show_error` pushes; the handler never panics on a malformed request.

pub mod dataset;
pub mod worker;

use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::column::{ColumnKind, ColumnSchema};
use crate::constants::{messages, paging};
use crate::error::{GridError, Result};
use crate::filters::Predicate;
use crate::filters::predicate::timestamp_ms;
use crate::format::{cell_text, parse_datetime};
use crate::protocol::{
    ClientMessage, ColumnInfo, FilterDescriptor, HostMessage, TextSelected, TriggeredBy,
};

pub use dataset::{DataSet, compare_cells};
pub use worker::{HostWorker, WorkerRequest, WorkerResult};

pub struct HostDataSource {
    data: DataSet,
    page_size: usize,
    /// Physical rows passing the filters, in display order
    view: Vec<usize>,
    filters: HashMap<String, FilterDescriptor>,
    sort: Option<(String, bool)>,
    viewport_top: usize,
    /// Selected display rows, as last reported by the grid
    selected: Vec<usize>,
    /// Last statistics sent per column
    stats: HashMap<String, ColumnInfo>,
    /// Full distinct-value listing per text column, for paging
    value_tables: HashMap<String, Vec<String>>,
}

impl HostDataSource {
    pub fn new(data: DataSet) -> Self {
        let view = (0..data.len()).collect();
        Self {
            data,
            page_size: paging::PAGE_SIZE,
            view,
            filters: HashMap::new(),
            sort: None,
            viewport_top: 0,
            selected: Vec::new(),
            stats: HashMap::new(),
            value_tables: HashMap::new(),
        }
    }

    pub fn data(&self) -> &DataSet {
        &self.data
    }

    /// Rows passing the current filters
    pub fn row_count(&self) -> usize {
        self.view.len()
    }

    pub fn selected_rows(&self) -> &[usize] {
        &self.selected
    }

    /// Pushes that build a fresh grid
    pub fn initial_messages(&self) -> Vec<HostMessage> {
        vec![
            HostMessage::DrawTable {
                columns: self.data.schema().to_vec(),
                row_count: self.view.len(),
            },
            self.data_view_push(None, None),
        ]
    }

    /// Answer one client message
    pub fn handle(&mut self, msg: ClientMessage) -> Vec<HostMessage> {
        profiling::scope!("HostDataSource::handle");
        let msg_type = msg.type_name();
        let triggered_by = msg.triggered_by();
        debug!(msg_type, "client request");
        match self.dispatch(msg) {
            Ok(pushes) => pushes,
            Err(e) => {
                warn!(msg_type, error = %e, "request failed");
                vec![HostMessage::ShowError {
                    error_msg: e.user_message(),
                    triggered_by,
                }]
            }
        }
    }

    fn dispatch(&mut self, msg: ClientMessage) -> Result<Vec<HostMessage>> {
        match msg {
            ClientMessage::ChangeFilter { field, filter_info } => {
                self.data.column_index(&field)?;
                self.filters.insert(field, filter_info);
                self.refresh_view();
                Ok(vec![self.data_view_push(Some(TriggeredBy::ChangeFilter), None)])
            }
            ClientMessage::ChangeSort {
                sort_field,
                sort_ascending,
            } => {
                self.data.column_index(&sort_field)?;
                self.sort = Some((sort_field, sort_ascending));
                self.refresh_view();
                Ok(vec![self.data_view_push(Some(TriggeredBy::ChangeSort), None)])
            }
            ClientMessage::ChangeViewport { top, .. } => {
                self.viewport_top = top;
                Ok(vec![self.data_view_push(Some(TriggeredBy::ChangeViewport), None)])
            }
            ClientMessage::ChangeViewportFilter { field, top, .. } => {
                Ok(vec![self.value_page(field, top)?])
            }
            ClientMessage::ChangeSelection { rows } => {
                self.selected = rows;
                Ok(Vec::new())
            }
            ClientMessage::EditCell {
                row_index,
                column,
                unfiltered_index,
                value,
            } => {
                self.edit_cell(row_index, &column, unfiltered_index.as_ref(), value)?;
                Ok(vec![self.data_view_push(Some(TriggeredBy::EditCell), None)])
            }
            ClientMessage::AddRow => {
                let row = self.add_row()?;
                Ok(vec![self.data_view_push(Some(TriggeredBy::AddRow), Some(row))])
            }
            ClientMessage::RemoveRow => {
                self.remove_rows();
                Ok(vec![self.data_view_push(Some(TriggeredBy::RemoveRow), None)])
            }
            ClientMessage::GetColumnMinMax { field, search_val } => {
                Ok(vec![self.column_statistics(field, search_val)?])
            }
            ClientMessage::ShowFilterDropdown { field } => {
                debug!(%field, "filter panel opened");
                Ok(Vec::new())
            }
        }
    }

    fn refresh_view(&mut self) {
        profiling::scope!("HostDataSource::refresh_view");
        let predicates: Vec<(usize, Predicate)> = self
            .filters
            .iter()
            .filter_map(|(field, descriptor)| {
                let predicate = Predicate::from_descriptor(descriptor);
                let col = self.data.column_index(field).ok()?;
                predicate.is_restrictive().then_some((col, predicate))
            })
            .collect();

        let data = &self.data;
        let mut view: Vec<usize> = (0..data.len())
            .filter(|&row| {
                predicates
                    .iter()
                    .all(|(col, p)| p.matches(data.value(row, *col)))
            })
            .collect();

        if let Some((field, ascending)) = &self.sort {
            if let Ok(col) = data.column_index(field) {
                view.sort_by(|&a, &b| compare_cells(data.value(a, col), data.value(b, col), *ascending));
            }
        }
        debug!(rows = view.len(), filters = predicates.len(), "view recomputed");
        self.view = view;
    }

    fn data_view_push(
        &self,
        triggered_by: Option<TriggeredBy>,
        scroll_to_row: Option<usize>,
    ) -> HostMessage {
        let from = self.viewport_top.saturating_sub(self.page_size);
        let to = self.viewport_top + self.page_size;
        let rows = self
            .view
            .iter()
            .skip(from)
            .take(to - from)
            .map(|&row| self.data.row(row))
            .collect();
        let (sort_field, sort_ascending) = match &self.sort {
            Some((field, ascending)) => (Some(field.clone()), *ascending),
            None => (None, true),
        };
        HostMessage::UpdateDataView {
            rows,
            df_range: (from, to),
            row_count: self.view.len(),
            sort_field,
            sort_ascending,
            triggered_by,
            scroll_to_row,
        }
    }

    /// Row data changed: slider and date domains are recomputed on next request
    fn forget_statistics(&mut self) {
        self.stats.clear();
    }

    fn edit_cell(
        &mut self,
        row_index: usize,
        column: &str,
        unfiltered_index: Option<&Value>,
        value: Value,
    ) -> Result<()> {
        let col = self.data.column_index(column)?;
        check_edit(&self.data.schema()[col], &value)?;
        let row = match unfiltered_index {
            Some(index) => self.data.find_index(index),
            None => self.view.get(row_index).copied(),
        }
        .ok_or_else(|| GridError::Host(format!("Row {} no longer exists", row_index)))?;
        self.data.set_value(row, col, value)?;
        self.forget_statistics();
        info!(row, column, "cell edited");
        Ok(())
    }

    /// Duplicate the last displayed row. Returns its display position.
    fn add_row(&mut self) -> Result<usize> {
        let source = self
            .view
            .last()
            .copied()
            .or_else(|| self.data.len().checked_sub(1))
            .ok_or(GridError::EmptyDataset)?;
        let new_row = self.data.duplicate_row(source)?;
        self.view.push(new_row);
        self.forget_statistics();
        let position = self.view.len() - 1;
        self.viewport_top = position;
        info!(position, "row added");
        Ok(position)
    }

    /// Remove the selected display rows
    fn remove_rows(&mut self) {
        let removed: BTreeSet<usize> = self
            .selected
            .iter()
            .filter_map(|&row| self.view.get(row).copied())
            .collect();
        self.data.remove_rows(&removed);
        self.view = self
            .view
            .iter()
            .filter(|row| !removed.contains(row))
            .map(|&row| row - removed.range(..row).count())
            .collect();
        self.selected.clear();
        self.forget_statistics();
        info!(removed = removed.len(), "rows removed");
    }

    fn value_page(&mut self, field: String, top: usize) -> Result<HostMessage> {
        let table = self.value_tables.get(&field).ok_or_else(|| {
            GridError::Host(format!("No value list loaded for column '{}'", field))
        })?;
        let to = (top + self.page_size).min(table.len());
        let from = top.saturating_sub(self.page_size).min(to);
        let values: Vec<Value> = table[from..to].iter().cloned().map(Value::String).collect();
        let length = table.len();

        let col = self.data.column_index(&field)?;
        let mut info = self
            .stats
            .get(&field)
            .cloned()
            .unwrap_or_else(|| ColumnInfo::new(&field, self.data.schema()[col].kind));
        info.value_range = Some((from, from + values.len()));
        info.values = Some(values);
        info.length = Some(length);
        self.stats.insert(field.clone(), info.clone());
        Ok(HostMessage::UpdateDataViewFilter {
            field,
            col_info: info,
        })
    }

    fn column_statistics(&mut self, field: String, search_val: Option<String>) -> Result<HostMessage> {
        profiling::scope!("HostDataSource::column_statistics");
        let col = self.data.column_index(&field)?;
        let schema = self.data.schema()[col].clone();
        let filter = self.filters.get(&field).cloned();
        let restrictive = filter
            .as_ref()
            .is_some_and(|f| Predicate::from_descriptor(f).is_restrictive());

        let mut info = self
            .stats
            .get(&field)
            .cloned()
            .unwrap_or_else(|| ColumnInfo::new(&field, schema.kind));
        info.filter_info = filter.clone();

        match schema.kind {
            ColumnKind::Integer | ColumnKind::Number => {
                if !restrictive || info.slider_min.is_none() {
                    let (min, max) = min_max(self.view_values(col).filter_map(Value::as_f64));
                    info.slider_min = min;
                    info.slider_max = max;
                }
            }
            ColumnKind::Datetime => {
                if !restrictive || info.filter_min.is_none() {
                    let (min, max) = min_max(self.view_values(col).filter_map(timestamp_ms));
                    info.filter_min = min;
                    info.filter_max = max;
                }
            }
            ColumnKind::Boolean => {
                if !restrictive || info.values.is_none() {
                    let present: HashSet<bool> =
                        self.view_values(col).filter_map(Value::as_bool).collect();
                    info.values = Some(
                        [true, false]
                            .into_iter()
                            .filter(|v| present.contains(v))
                            .map(Value::Bool)
                            .collect(),
                    );
                }
            }
            ColumnKind::String | ColumnKind::Any | ColumnKind::Interval => {
                self.text_statistics(&schema, col, filter.as_ref(), search_val.as_deref(), &mut info);
            }
        }

        self.stats.insert(field.clone(), info.clone());
        Ok(if search_val.is_some() {
            HostMessage::UpdateDataViewFilter {
                field,
                col_info: info,
            }
        } else {
            HostMessage::ColumnMinMaxUpdated {
                field,
                col_info: info,
            }
        })
    }

    /// Distinct values with the current selection listed first
    fn text_statistics(
        &mut self,
        schema: &ColumnSchema,
        col: usize,
        filter: Option<&FilterDescriptor>,
        search_val: Option<&str>,
        info: &mut ColumnInfo,
    ) {
        let unique: Vec<String> = if schema.kind == ColumnKind::Any {
            schema.enum_values().iter().filter_map(cell_text).collect()
        } else {
            let distinct: BTreeSet<String> = if filter.is_some() {
                self.data.column_values(col).iter().filter_map(cell_text).collect()
            } else {
                self.view_values(col).filter_map(cell_text).collect()
            };
            distinct.into_iter().collect()
        };
        let unique: Vec<String> = match search_val {
            Some(search) => {
                let needle = search.to_lowercase();
                unique
                    .into_iter()
                    .filter(|v| v.to_lowercase().contains(&needle))
                    .collect()
            }
            None => unique,
        };

        let (mut values, selected_length) = match filter {
            Some(FilterDescriptor::Text {
                selected: Some(TextSelected::All(_)),
                excluded,
                ..
            }) => {
                let excluded: Vec<String> = excluded.clone().unwrap_or_default();
                let mut listed: Vec<String> = unique
                    .into_iter()
                    .filter(|v| !excluded.contains(v))
                    .collect();
                let count = listed.len();
                listed.extend(excluded);
                (listed, count)
            }
            Some(FilterDescriptor::Text {
                selected: Some(TextSelected::Values(selected)),
                ..
            }) if !selected.is_empty() => {
                let mut listed = selected.clone();
                let count = listed.len();
                let chosen: HashSet<&String> = selected.iter().collect();
                listed.extend(unique.into_iter().filter(|v| !chosen.contains(v)));
                (listed, count)
            }
            _ => (unique, 0),
        };

        let length = values.len();
        if search_val.is_none() {
            self.value_tables.insert(schema.name.clone(), values.clone());
        }
        if schema.kind != ColumnKind::Any {
            values.truncate(paging::MAX_FILTER_VALUES);
        }
        info.value_range = Some((0, values.len()));
        info.values = Some(values.into_iter().map(Value::String).collect());
        info.length = Some(length);
        info.selected_length = Some(selected_length);
    }

    fn view_values(&self, col: usize) -> impl Iterator<Item = &Value> + '_ {
        self.view.iter().map(move |&row| self.data.value(row, col))
    }
}

fn min_max<T: PartialOrd + Copy>(values: impl Iterator<Item = T>) -> (Option<T>, Option<T>) {
    values.fold((None, None), |(lo, hi), v| {
        (
            Some(lo.map_or(v, |lo| if v < lo { v } else { lo })),
            Some(hi.map_or(v, |hi| if v > hi { v } else { hi })),
        )
    })
}

/// Host-side type check for an edited value
fn check_edit(schema: &ColumnSchema, value: &Value) -> Result<()> {
    let reject = |message: String| GridError::InvalidEdit {
        column: schema.name.clone(),
        message,
    };
    if schema.is_index {
        return Err(reject(messages::INDEX_NOT_EDITABLE.to_string()));
    }
    if value.is_null() {
        return Ok(());
    }
    let fits = match schema.kind {
        ColumnKind::Integer => value.is_i64() || value.is_u64(),
        ColumnKind::Number => value.is_number(),
        ColumnKind::Boolean => value.is_boolean(),
        ColumnKind::Datetime => value.as_str().is_some_and(|s| parse_datetime(s).is_some()),
        ColumnKind::String | ColumnKind::Interval => value.is_string(),
        ColumnKind::Any => schema.enum_values().contains(value),
    };
    if fits {
        Ok(())
    } else {
        Err(reject(format!(
            "Cannot store {} in a column of type {}",
            value,
            schema.kind.as_str()
        )))
    }
}

#[cfg(test)]
mod tests;
