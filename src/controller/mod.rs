//! Grid controller
//!
//! Owns the columns, filters, sort, selection and the current data view. User
//! gestures become `ClientMessage`s on the transport; host pushes are applied
//! through `handle_host_message`. Debounced work runs from `tick`.

pub mod selection;
pub mod sort;
pub mod toolbar;
pub mod viewport;

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::column::{Column, ColumnSchema, build_columns};
use crate::data_view::{DataView, ViewportRange};
use crate::error::{GridError, Result};
use crate::filters::{
    BooleanFilter, ColumnFilter, DateFilter, DocumentEvent, Filter, FilterEvent, FilterPanelSlot,
    PanelContent, SliderFilter, TextFilter,
};
use crate::format::CellFormatter;
use crate::options::GridSettings;
use crate::protocol::{ClientMessage, ColumnInfo, HostMessage, Row, TriggeredBy};
use crate::schedule::Clock;
use crate::transport::Transport;

pub use selection::{ClickModifiers, SelectionModel};
pub use sort::{SortIndicator, SortState};
pub use toolbar::{RowOperation, ToolbarState};
pub use viewport::ViewportSync;

/// A message waiting to be acknowledged by the user
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
}

/// Requests the host has not answered yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingRequests {
    pub viewport: bool,
    pub sort: bool,
    pub row_operation: Option<RowOperation>,
}

impl PendingRequests {
    pub fn any(&self) -> bool {
        self.viewport || self.sort || self.row_operation.is_some()
    }
}

pub struct GridController<T: Transport> {
    transport: T,
    clock: Rc<dyn Clock>,
    settings: GridSettings,
    columns: Vec<Column>,
    filters: Vec<ColumnFilter>,
    data_view: Arc<DataView>,
    viewport: ViewportSync,
    /// Rows the renderer currently shows, updated on every scroll
    rendered: ViewportRange,
    sort: SortState,
    selection: SelectionModel,
    toolbar: ToolbarState,
    panel: FilterPanelSlot,
    formatter: CellFormatter,
    alerts: VecDeque<Alert>,
    scroll_to_row: Option<usize>,
    grid_height: (f32, bool),
    resizing_column: bool,
}

impl<T: Transport> GridController<T> {
    pub fn new(transport: T, clock: Rc<dyn Clock>, settings: GridSettings) -> Self {
        let toolbar = ToolbarState::new(settings.show_toolbar);
        let grid_height = settings.options.grid_height(0);
        Self {
            transport,
            clock,
            settings,
            columns: Vec::new(),
            filters: Vec::new(),
            data_view: Arc::new(DataView::empty(0)),
            viewport: ViewportSync::new(),
            rendered: ViewportRange::default(),
            sort: SortState::new(),
            selection: SelectionModel::new(),
            toolbar,
            panel: FilterPanelSlot::new(),
            formatter: CellFormatter::new(),
            alerts: VecDeque::new(),
            scroll_to_row: None,
            grid_height,
            resizing_column: false,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Snapshot for rendering; replaced wholesale on every push
    pub fn data_view(&self) -> Arc<DataView> {
        Arc::clone(&self.data_view)
    }

    pub fn filter(&self, field: &str) -> Option<&ColumnFilter> {
        self.filters.iter().find(|f| f.field() == field)
    }

    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    pub fn has_active_filter(&self) -> bool {
        self.filters.iter().any(|f| f.is_active())
    }

    fn has_active_filter_except(&self, field: &str) -> bool {
        self.filters
            .iter()
            .any(|f| f.field() != field && f.is_active())
    }

    /// Some filter edit is waiting for its debounce window
    pub fn has_pending_edit(&self) -> bool {
        self.filters.iter().any(|f| f.has_pending_edit())
    }

    pub fn pending_requests(&self) -> PendingRequests {
        PendingRequests {
            viewport: self.viewport.response_expected(),
            sort: self.sort.in_progress(),
            row_operation: self.toolbar.in_progress(),
        }
    }

    pub fn sort_indicator(&self, field: &str) -> SortIndicator {
        self.sort.indicator(field)
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    pub fn panel(&self) -> &FilterPanelSlot {
        &self.panel
    }

    /// Grid height in points and whether it needs a scrollbar
    pub fn grid_height(&self) -> (f32, bool) {
        self.grid_height
    }

    pub fn take_scroll_request(&mut self) -> Option<usize> {
        self.scroll_to_row.take()
    }

    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn dismiss_alert(&mut self) -> Option<Alert> {
        self.alerts.pop_front()
    }

    /// Format one cell of column `col`
    pub fn format_cell(&mut self, col: usize, value: &Value) -> String {
        match self.columns.get(col) {
            Some(column) => self.formatter.format(column, value),
            None => String::new(),
        }
    }

    /// Whether a datetime column widened its format since the last call
    pub fn take_redraw_all(&mut self) -> bool {
        self.formatter.take_invalidation()
    }

    fn column(&self, field: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.field() == field)
            .ok_or_else(|| GridError::UnknownColumn {
                field: field.to_string(),
            })
    }

    fn index_field(&self) -> Option<&str> {
        self.columns.iter().find(|c| c.is_index()).map(Column::field)
    }

    fn filter_mut(&mut self, field: &str) -> Result<&mut ColumnFilter> {
        if !self.columns.iter().any(|c| c.field() == field) {
            return Err(GridError::UnknownColumn {
                field: field.to_string(),
            });
        }
        self.filters
            .iter_mut()
            .find(|f| f.field() == field)
            .ok_or_else(|| GridError::NotFilterable {
                field: field.to_string(),
            })
    }

    fn send(&self, msg: ClientMessage) {
        debug!(msg_type = msg.type_name(), "sending to host");
        self.transport.send(msg);
    }

    fn push_alert(&mut self, title: &'static str, message: String) {
        info!(title, %message, "alert");
        self.alerts.push_back(Alert { title, message });
    }

    fn alert_error(&mut self, err: &GridError) {
        self.push_alert(err.title(), err.user_message());
    }

    fn update_size(&mut self) {
        self.grid_height = self.settings.options.grid_height(self.data_view.len());
    }

    // ------------------------------------------------------------------
    // Host pushes
    // ------------------------------------------------------------------

    pub fn handle_host_message(&mut self, msg: HostMessage) {
        profiling::scope!("GridController::handle_host_message");
        debug!(msg_type = msg.type_name(), "host push");
        match msg {
            HostMessage::DrawTable { columns, row_count } => self.draw_table(columns, row_count),
            HostMessage::UpdateDataView {
                rows,
                df_range,
                row_count,
                sort_field,
                sort_ascending,
                triggered_by,
                scroll_to_row,
            } => self.apply_data_view(DataViewPush {
                rows,
                df_range,
                row_count,
                sort_field,
                sort_ascending,
                triggered_by,
                scroll_to_row,
            }),
            HostMessage::ColumnMinMaxUpdated { field, col_info } => {
                self.column_stats_updated(&field, &col_info)
            }
            HostMessage::UpdateDataViewFilter { field, col_info } => match self.filter_mut(&field) {
                Ok(ColumnFilter::Text(filter)) => filter.update_value_page(&col_info),
                Ok(_) | Err(_) => warn!(%field, "value page for a column without a text filter"),
            },
            HostMessage::ChangeSelection { rows } => {
                self.selection.set(rows.iter().copied());
                if let Some(&first) = rows.first() {
                    self.scroll_to_row = Some(first);
                }
            }
            HostMessage::ShowError {
                error_msg,
                triggered_by,
            } => {
                warn!(?triggered_by, %error_msg, "host reported an error");
                self.push_alert("Error", error_msg);
                if matches!(
                    triggered_by,
                    Some(TriggeredBy::AddRow | TriggeredBy::RemoveRow)
                ) {
                    self.toolbar.finish();
                }
            }
            HostMessage::ChangeGridOption {
                option_name,
                option_value,
            } => match self.settings.options.set_option(&option_name, &option_value) {
                Ok(true) => self.update_size(),
                Ok(false) => {}
                Err(e) => warn!(%option_name, error = %e, "grid option rejected"),
            },
            HostMessage::ChangeShowToolbar { show_toolbar } => {
                self.settings.show_toolbar = show_toolbar;
                self.toolbar.visible = show_toolbar;
            }
        }
    }

    fn draw_table(&mut self, schema: Vec<ColumnSchema>, row_count: usize) {
        self.columns = build_columns(schema, self.settings.options.editable);
        self.filters = if self.settings.options.filterable {
            self.columns
                .iter()
                .filter_map(ColumnFilter::for_column)
                .collect()
        } else {
            Vec::new()
        };
        info!(
            columns = self.columns.len(),
            filters = self.filters.len(),
            row_count,
            "grid built"
        );
        self.data_view = Arc::new(DataView::empty(row_count));
        self.viewport.reset();
        self.sort = SortState::new();
        self.selection.clear();
        self.panel.hide();
        self.formatter.clear();
        self.toolbar.set_filter_active(false);
        self.toolbar.finish();
        self.update_size();
    }

    fn apply_data_view(&mut self, push: DataViewPush) {
        let DataViewPush {
            rows,
            df_range,
            row_count,
            sort_field,
            sort_ascending,
            triggered_by,
            scroll_to_row,
        } = push;

        let filter_active = self.has_active_filter();
        self.toolbar.set_filter_active(filter_active);

        if triggered_by == Some(TriggeredBy::ChangeViewport) {
            if let Some(next) = self.viewport.on_response() {
                debug!(top = next.top, bottom = next.bottom, "sending queued viewport");
                self.send(ClientMessage::ChangeViewport {
                    top: next.top,
                    bottom: next.bottom,
                });
                return;
            }
        }

        if triggered_by == Some(TriggeredBy::ChangeSort) {
            self.sort.confirm(sort_field, sort_ascending);
        }

        let preserved_top = (triggered_by == Some(TriggeredBy::RemoveRow)).then_some(self.rendered.top);

        self.data_view = Arc::new(DataView::new(rows, df_range, row_count));

        let row_op = matches!(
            triggered_by,
            Some(TriggeredBy::AddRow | TriggeredBy::RemoveRow)
        );
        if row_op && !filter_active {
            self.update_size();
        }
        self.toolbar.finish();

        match triggered_by {
            Some(TriggeredBy::RemoveRow) => {
                self.selection.clear();
                self.scroll_to_row = preserved_top;
            }
            Some(TriggeredBy::AddRow) => {
                if let Some(row) = scroll_to_row {
                    self.scroll_to_row = Some(row);
                    self.selection.set([row]);
                }
            }
            Some(TriggeredBy::ChangeViewport) if self.viewport.last_settled().bottom >= row_count => {
                self.scroll_to_row = Some(row_count.saturating_sub(1));
            }
            _ => {}
        }

        let limit = row_count.min(df_range.1);
        let rows = self.selection.rows_below(limit);
        self.send(ClientMessage::ChangeSelection { rows });
    }

    fn column_stats_updated(&mut self, field: &str, info: &ColumnInfo) {
        let elsewhere = self.has_active_filter_except(field);
        let filter = match self.filter_mut(field) {
            Ok(filter) => filter,
            Err(e) => {
                warn!(%field, error = %e, "statistics for an unfiltered column");
                return;
            }
        };
        filter.update_min_max(info, elsewhere);
        let content = if filter.is_degenerate() {
            PanelContent::DegenerateNotice
        } else {
            PanelContent::Controls
        };
        self.panel.show(field, content);
        self.send(ClientMessage::ShowFilterDropdown {
            field: field.to_string(),
        });
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Column header clicked. Returns true when a sort request went out.
    pub fn header_clicked(&mut self, field: &str) -> bool {
        if self.resizing_column {
            debug!(%field, "header click ignored during column resize");
            return false;
        }
        if !self.settings.options.sortable {
            return false;
        }
        let Ok(column) = self.column(field) else {
            return false;
        };
        if !column.schema.sortable {
            return false;
        }
        let column = column.clone();
        match self.sort.click(&column) {
            Some((sort_field, sort_ascending)) => {
                self.send(ClientMessage::ChangeSort {
                    sort_field,
                    sort_ascending,
                });
                true
            }
            None => {
                debug!(%field, "sort in progress, header click ignored");
                false
            }
        }
    }

    pub fn set_column_resizing(&mut self, resizing: bool) {
        self.resizing_column = resizing;
    }

    /// Renderer scrolled to show `[top, bottom)`
    pub fn viewport_changed(&mut self, top: usize, bottom: usize) {
        let range = ViewportRange::new(top, bottom);
        if range == self.rendered {
            return;
        }
        self.rendered = range;
        self.viewport.scrolled(self.clock.now(), range);
    }

    pub fn row_clicked(&mut self, row: usize, modifiers: ClickModifiers) {
        if self.selection.click(row, modifiers) {
            self.send(ClientMessage::ChangeSelection {
                rows: self.selection.rows(),
            });
        }
    }

    /// Validate and submit a cell edit
    pub fn cell_edited(&mut self, row_index: usize, field: &str, input: &str) -> Result<()> {
        let column = self.column(field)?;
        let Some(editor) = column.editor else {
            return Err(GridError::InvalidEdit {
                column: field.to_string(),
                message: "Column is not editable".to_string(),
            });
        };
        let value = editor.parse(column, input).inspect_err(|e| {
            debug!(%field, error = %e, "edit rejected locally");
        })?;
        let unfiltered_index = self
            .index_field()
            .and_then(|index| self.data_view.get_item(row_index).get(index).cloned());
        self.send(ClientMessage::EditCell {
            row_index,
            column: field.to_string(),
            unfiltered_index,
            value,
        });
        Ok(())
    }

    pub fn add_row(&mut self) -> Result<()> {
        self.row_operation(RowOperation::Add)
    }

    pub fn remove_row(&mut self) -> Result<()> {
        self.row_operation(RowOperation::Remove)
    }

    fn row_operation(&mut self, op: RowOperation) -> Result<()> {
        if !self.toolbar.enabled() {
            debug!(?op, "toolbar disabled while a filter is active");
            return Ok(());
        }
        if let Err(e) = self.toolbar.begin(op) {
            warn!(?op, "row operation already in progress");
            self.alert_error(&e);
            return Err(e);
        }
        self.send(match op {
            RowOperation::Add => ClientMessage::AddRow,
            RowOperation::Remove => ClientMessage::RemoveRow,
        });
        Ok(())
    }

    /// Ask the host for fresh statistics; the panel opens when they arrive
    pub fn filter_button_clicked(&mut self, field: &str) -> Result<()> {
        self.filter_mut(field)?;
        self.send(ClientMessage::GetColumnMinMax {
            field: field.to_string(),
            search_val: None,
        });
        Ok(())
    }

    fn slider_mut(&mut self, field: &str) -> Result<&mut SliderFilter> {
        match self.filter_mut(field)? {
            ColumnFilter::Slider(f) => Ok(f),
            _ => Err(GridError::NotFilterable {
                field: field.to_string(),
            }),
        }
    }

    fn date_mut(&mut self, field: &str) -> Result<&mut DateFilter> {
        match self.filter_mut(field)? {
            ColumnFilter::Date(f) => Ok(f),
            _ => Err(GridError::NotFilterable {
                field: field.to_string(),
            }),
        }
    }

    fn boolean_mut(&mut self, field: &str) -> Result<&mut BooleanFilter> {
        match self.filter_mut(field)? {
            ColumnFilter::Boolean(f) => Ok(f),
            _ => Err(GridError::NotFilterable {
                field: field.to_string(),
            }),
        }
    }

    fn text_mut(&mut self, field: &str) -> Result<&mut TextFilter> {
        match self.filter_mut(field)? {
            ColumnFilter::Text(f) => Ok(f),
            _ => Err(GridError::NotFilterable {
                field: field.to_string(),
            }),
        }
    }

    fn emit(&self, event: Option<FilterEvent>) {
        if let Some(event) = event {
            self.send(event.into_message());
        }
    }

    pub fn slider_moved(&mut self, field: &str, lower: f64, upper: f64) -> Result<()> {
        let now = self.clock.now();
        self.slider_mut(field)?.slide(now, lower, upper);
        Ok(())
    }

    pub fn date_start_picked(&mut self, field: &str, date: NaiveDate) -> Result<()> {
        let event = self.date_mut(field)?.pick_start(date);
        self.emit(event);
        Ok(())
    }

    pub fn date_end_picked(&mut self, field: &str, date: NaiveDate) -> Result<()> {
        let event = self.date_mut(field)?.pick_end(date);
        self.emit(event);
        Ok(())
    }

    pub fn boolean_selected(&mut self, field: &str, selected: Option<bool>) -> Result<()> {
        let event = self.boolean_mut(field)?.select(selected);
        self.emit(event);
        Ok(())
    }

    pub fn text_value_toggled(&mut self, field: &str, value: &str) -> Result<()> {
        let event = self.text_mut(field)?.toggle_value(value);
        self.emit(Some(event));
        Ok(())
    }

    pub fn text_select_all(&mut self, field: &str) -> Result<()> {
        let event = self.text_mut(field)?.select_all();
        self.emit(Some(event));
        Ok(())
    }

    pub fn text_search_changed(&mut self, field: &str, text: &str) -> Result<()> {
        let now = self.clock.now();
        self.text_mut(field)?.set_search(now, text);
        Ok(())
    }

    pub fn text_values_scrolled(&mut self, field: &str, top: usize, bottom: usize) -> Result<()> {
        let now = self.clock.now();
        self.text_mut(field)?.scroll_values(now, top, bottom);
        Ok(())
    }

    /// Reset link in a filter panel
    pub fn reset_filter(&mut self, field: &str) -> Result<()> {
        let filter = self.filter_mut(field)?;
        filter.reset_filter();
        let info = filter.filter_info();
        self.emit(Some(FilterEvent::Changed(info)));
        Ok(())
    }

    pub fn close_filter_panel(&mut self) {
        self.panel.hide();
    }

    pub fn document_event(&mut self, event: DocumentEvent) {
        self.panel.handle_document_event(event);
    }

    /// Run debounced work whose window has elapsed
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(range) = self.viewport.poll(now) {
            self.send(ClientMessage::ChangeViewport {
                top: range.top,
                bottom: range.bottom,
            });
        }
        let events: Vec<FilterEvent> = self
            .filters
            .iter_mut()
            .flat_map(|f| f.poll(now))
            .collect();
        for event in events {
            self.send(event.into_message());
        }
    }
}

struct DataViewPush {
    rows: Vec<Row>,
    df_range: (usize, usize),
    row_count: usize,
    sort_field: Option<String>,
    sort_ascending: bool,
    triggered_by: Option<TriggeredBy>,
    scroll_to_row: Option<usize>,
}
