use eframe::egui::{self, Align, Key, Layout, RichText, Sense};
use egui_extras::{Column as TableColumn, TableBuilder};
use tracing::warn;

use crate::column::{Column, ColumnKind};
use crate::constants::messages;
use crate::controller::{ClickModifiers, GridController, SortIndicator};
use crate::filters::Filter;
use crate::format::cell_text;
use crate::options::GridOptions;
use crate::transport::Transport;

/// A cell being edited in place
#[derive(Debug, Clone)]
pub struct CellEdit {
    pub row: usize,
    pub field: String,
    pub text: String,
    pub error: Option<String>,
    focused: bool,
}

/// Table state that outlives a frame
#[derive(Debug, Default)]
pub struct GridTableState {
    pub edit: Option<CellEdit>,
    header_widths: Vec<f32>,
}

fn table_column(column: &Column, options: &GridOptions, last: bool) -> TableColumn {
    let width = column.schema.width.unwrap_or(options.default_column_width);
    let mut table_column = if last && options.force_fit_columns {
        TableColumn::remainder()
    } else {
        TableColumn::initial(width)
    };
    table_column = table_column.resizable(true).clip(true);
    if let Some(min) = column.schema.min_width {
        table_column = table_column.at_least(min);
    }
    if let Some(max) = column.schema.max_width {
        table_column = table_column.at_most(max);
    }
    table_column
}

fn header_cell<T: Transport>(ctl: &mut GridController<T>, column: &Column, ui: &mut egui::Ui) {
    let field = column.field();
    let sortable = ctl.settings().options.sortable && column.schema.sortable;

    let button = egui::Button::new(RichText::new(column.display_name()).strong()).frame(false);
    let response = ui.add(button);
    let response = if sortable {
        response.on_hover_text("Click to sort")
    } else {
        response
    };

    match ctl.sort_indicator(field) {
        SortIndicator::None => {}
        SortIndicator::Ascending => {
            ui.label("↑");
        }
        SortIndicator::Descending => {
            ui.label("↓");
        }
        SortIndicator::Spinner => {
            ui.spinner();
        }
    }

    let filter_state = ctl.filter(field).map(|f| (f.is_active(), f.is_degenerate()));
    if let Some((active, degenerate)) = filter_state {
        let icon = if active {
            RichText::new("⏷").color(ui.visuals().selection.bg_fill)
        } else if degenerate {
            RichText::new("⏷").weak()
        } else {
            RichText::new("⏷")
        };
        let hover = filter_button_hint(degenerate);
        if ui.small_button(icon).on_hover_text(hover).clicked() {
            if let Err(e) = ctl.filter_button_clicked(field) {
                warn!(%field, error = %e, "filter button");
            }
        }
    }

    if response.clicked() {
        ctl.header_clicked(field);
    }
}

/// Tooltip for a header's filter button
fn filter_button_hint(degenerate: bool) -> &'static str {
    if degenerate {
        messages::DEGENERATE_COLUMN
    } else {
        "Filter"
    }
}

/// Initial editor text for a cell
fn edit_text<T: Transport>(
    ctl: &mut GridController<T>,
    col: usize,
    kind: ColumnKind,
    value: &serde_json::Value,
) -> String {
    if kind == ColumnKind::Datetime {
        ctl.format_cell(col, value)
    } else {
        cell_text(value).unwrap_or_default()
    }
}

/// Show the in-place editor. Returns true once the edit is finished.
fn edit_cell<T: Transport>(
    ctl: &mut GridController<T>,
    edit: &mut CellEdit,
    ui: &mut egui::Ui,
) -> bool {
    let response =
        ui.add(egui::TextEdit::singleline(&mut edit.text).desired_width(f32::INFINITY));
    if !edit.focused {
        response.request_focus();
        edit.focused = true;
    }
    if let Some(error) = &edit.error {
        response.on_hover_text(RichText::new(error).color(ui.visuals().error_fg_color));
    }

    let (enter, escape) = ui.input(|i| (i.key_pressed(Key::Enter), i.key_pressed(Key::Escape)));
    if escape {
        return true;
    }
    if enter {
        return match ctl.cell_edited(edit.row, &edit.field, &edit.text) {
            Ok(()) => true,
            Err(e) => {
                edit.error = Some(e.user_message());
                false
            }
        };
    }
    false
}

/// Render the windowed grid. Rows outside the resident window show a placeholder.
pub fn render_grid_table<T: Transport>(
    ctl: &mut GridController<T>,
    state: &mut GridTableState,
    ui: &mut egui::Ui,
) {
    profiling::scope!("render_grid_table");

    let columns = ctl.columns().to_vec();
    if columns.is_empty() {
        ui.vertical_centered(|ui| {
            ui.heading("No data loaded");
            ui.label("Open a CSV or Parquet file, or drop one here");
        });
        return;
    }
    if ctl.take_redraw_all() {
        ui.ctx().request_repaint();
    }

    let view = ctl.data_view();
    let options = ctl.settings().options.clone();
    let (height, _) = ctl.grid_height();
    let modifiers = ui.input(|i| i.modifiers);

    let mut builder = TableBuilder::new(ui)
        .striped(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .min_scrolled_height(height)
        .max_scroll_height(height)
        .sense(Sense::click());
    for (i, column) in columns.iter().enumerate() {
        builder = builder.column(table_column(column, &options, i + 1 == columns.len()));
    }
    if let Some(row) = ctl.take_scroll_request() {
        builder = builder.scroll_to_row(row, Some(Align::Center));
    }

    let mut widths = Vec::with_capacity(columns.len());
    let mut rendered: Option<(usize, usize)> = None;

    builder
        .header(options.row_height, |mut header| {
            for column in &columns {
                header.col(|ui| {
                    widths.push(ui.max_rect().width());
                    header_cell(ctl, column, ui);
                });
            }
        })
        .body(|body| {
            body.rows(options.row_height, view.len(), |mut row| {
                let index = row.index();
                rendered = Some(match rendered {
                    Some((top, bottom)) => (top.min(index), bottom.max(index + 1)),
                    None => (index, index + 1),
                });

                let item = view.get_item(index);
                if options.highlight_selected_row && ctl.selection().is_selected(index) {
                    row.set_selected(true);
                }

                for (col, column) in columns.iter().enumerate() {
                    let editing = state
                        .edit
                        .as_ref()
                        .is_some_and(|e| e.row == index && e.field == column.field());
                    let (_, cell) = row.col(|ui| {
                        if editing {
                            if let Some(edit) = state.edit.as_mut() {
                                if edit_cell(ctl, edit, ui) {
                                    state.edit = None;
                                }
                            }
                            return;
                        }
                        if !item.is_loaded() {
                            ui.weak("…");
                            return;
                        }
                        let value = item.get(column.field()).unwrap_or(&serde_json::Value::Null);
                        let text = ctl.format_cell(col, value);
                        if column.is_index() && options.bold_index {
                            ui.strong(text);
                        } else {
                            ui.label(text);
                        }
                    });

                    let can_edit = options.editable && column.editor.is_some() && item.is_loaded();
                    if !editing && can_edit && cell.double_clicked() {
                        let value = item.get(column.field()).unwrap_or(&serde_json::Value::Null);
                        let text = edit_text(ctl, col, column.kind(), value);
                        state.edit = Some(CellEdit {
                            row: index,
                            field: column.field().to_string(),
                            text,
                            error: None,
                            focused: false,
                        });
                    }
                }

                if row.response().clicked() {
                    ctl.row_clicked(
                        index,
                        ClickModifiers {
                            toggle: modifiers.command,
                            extend: modifiers.shift,
                        },
                    );
                }
            });
        });

    // A header width changing under a held pointer is a column resize
    let pointer_down = ui.input(|i| i.pointer.primary_down());
    if !pointer_down {
        ctl.set_column_resizing(false);
    } else if !state.header_widths.is_empty() && widths != state.header_widths {
        ctl.set_column_resizing(true);
    }
    state.header_widths = widths;

    if let Some((top, bottom)) = rendered {
        ctl.viewport_changed(top, bottom);
    }
}
