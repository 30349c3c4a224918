//! Filter dropdown window
//!
//! Controls draw from a snapshot of the column's filter and record the user's
//! gestures as actions; the actions are applied to the controller once the
//! window is finished, so the controller is never borrowed across widgets.

use chrono::NaiveDate;
use eframe::egui::{self, ScrollArea};
use egui_extras::DatePickerButton;
use tracing::warn;

use crate::constants::{layout, messages};
use crate::controller::GridController;
use crate::filters::{BooleanFilter, ColumnFilter, DateFilter, SliderFilter, TextFilter};
use crate::transport::Transport;

enum PanelAction {
    Slide(f64, f64),
    DateStart(NaiveDate),
    DateEnd(NaiveDate),
    Boolean(Option<bool>),
    Toggle(String),
    SelectAll,
    Search(String),
    Scroll(usize, usize),
    Reset,
    Close,
}

fn slider_controls(
    filter: &SliderFilter,
    precision: usize,
    ui: &mut egui::Ui,
    actions: &mut Vec<PanelAction>,
) {
    let (Some((min, max)), Some((mut lower, mut upper))) =
        (filter.domain(), filter.handle_positions())
    else {
        ui.spinner();
        return;
    };
    let step = filter.step();

    let lower_changed = ui
        .add(
            egui::Slider::new(&mut lower, min..=max)
                .step_by(step)
                .max_decimals(precision)
                .text("min"),
        )
        .changed();
    let upper_changed = ui
        .add(
            egui::Slider::new(&mut upper, min..=max)
                .step_by(step)
                .max_decimals(precision)
                .text("max"),
        )
        .changed();
    if lower_changed || upper_changed {
        actions.push(PanelAction::Slide(lower, upper));
    }
}

fn date_controls(filter: &DateFilter, ui: &mut egui::Ui, actions: &mut Vec<PanelAction>) {
    let Some((mut start, mut end)) = filter.picker_dates() else {
        ui.spinner();
        return;
    };
    egui::Grid::new("date_filter").num_columns(2).show(ui, |ui| {
        ui.label("From");
        if ui
            .add(DatePickerButton::new(&mut start).id_salt("date_filter_start"))
            .changed()
        {
            actions.push(PanelAction::DateStart(start));
        }
        ui.end_row();

        ui.label("To");
        if ui
            .add(DatePickerButton::new(&mut end).id_salt("date_filter_end"))
            .changed()
        {
            actions.push(PanelAction::DateEnd(end));
        }
        ui.end_row();
    });
}

fn boolean_controls(filter: &BooleanFilter, ui: &mut egui::Ui, actions: &mut Vec<PanelAction>) {
    let selected = filter.selected();
    if ui.radio(selected.is_none(), "All").clicked() {
        actions.push(PanelAction::Boolean(None));
    }
    for &value in filter.values() {
        let label = if value { "True" } else { "False" };
        if ui.radio(selected == Some(value), label).clicked() {
            actions.push(PanelAction::Boolean(Some(value)));
        }
    }
}

fn value_checkbox(filter: &TextFilter, value: &str, ui: &mut egui::Ui, actions: &mut Vec<PanelAction>) {
    let mut checked = filter.is_checked(value);
    if ui.checkbox(&mut checked, value).changed() {
        actions.push(PanelAction::Toggle(value.to_string()));
    }
}

fn text_controls(filter: &TextFilter, ui: &mut egui::Ui, actions: &mut Vec<PanelAction>) {
    let mut search = filter.search_text().to_string();
    let response = ui.add(egui::TextEdit::singleline(&mut search).hint_text("Search..."));
    if response.changed() {
        actions.push(PanelAction::Search(search));
    }
    if ui.button("Select all").clicked() {
        actions.push(PanelAction::SelectAll);
    }
    ui.separator();

    let row_height = layout::FILTER_ROW_HEIGHT;
    let max_height = row_height * layout::FILTER_VISIBLE_ROWS as f32;

    if !filter.search_text().is_empty() {
        let values = filter.visible_values();
        if values.is_empty() {
            ui.weak(messages::NO_RESULTS);
            return;
        }
        ScrollArea::vertical().max_height(max_height).show(ui, |ui| {
            for value in values {
                value_checkbox(filter, value, ui, actions);
            }
        });
        return;
    }

    ScrollArea::vertical()
        .max_height(max_height)
        .show_rows(ui, row_height, filter.len(), |ui, rows| {
            let mut missing = false;
            for i in rows.clone() {
                match filter.value_at(i) {
                    Some(value) => value_checkbox(filter, value, ui, actions),
                    None => {
                        missing = true;
                        ui.weak("…");
                    }
                }
            }
            if missing {
                actions.push(PanelAction::Scroll(rows.start, rows.end));
            }
        });
}

fn apply<T: Transport>(ctl: &mut GridController<T>, field: &str, action: PanelAction) {
    let result = match action {
        PanelAction::Slide(lower, upper) => ctl.slider_moved(field, lower, upper),
        PanelAction::DateStart(date) => ctl.date_start_picked(field, date),
        PanelAction::DateEnd(date) => ctl.date_end_picked(field, date),
        PanelAction::Boolean(selected) => ctl.boolean_selected(field, selected),
        PanelAction::Toggle(value) => ctl.text_value_toggled(field, &value),
        PanelAction::SelectAll => ctl.text_select_all(field),
        PanelAction::Search(text) => ctl.text_search_changed(field, &text),
        PanelAction::Scroll(top, bottom) => ctl.text_values_scrolled(field, top, bottom),
        PanelAction::Reset => ctl.reset_filter(field),
        PanelAction::Close => {
            ctl.close_filter_panel();
            Ok(())
        }
    };
    if let Err(e) = result {
        warn!(%field, error = %e, "filter panel action");
    }
}

/// Draw the open filter panel, if any. Returns the window's screen rect.
pub fn render_filter_panel<T: Transport>(
    ctl: &mut GridController<T>,
    ctx: &egui::Context,
) -> Option<egui::Rect> {
    profiling::scope!("render_filter_panel");

    let open = ctl.panel().current()?.clone();
    let filter = ctl.filter(&open.field).cloned();
    let precision = ctl.settings().precision;
    let mut actions = Vec::new();

    let response = egui::Window::new(format!("Filter: {}", open.field))
        .id(egui::Id::new("filter_panel"))
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            if let Some(notice) = open.content.notice() {
                ui.label(notice);
            } else {
                match &filter {
                    Some(ColumnFilter::Slider(f)) => slider_controls(f, precision, ui, &mut actions),
                    Some(ColumnFilter::Date(f)) => date_controls(f, ui, &mut actions),
                    Some(ColumnFilter::Boolean(f)) => boolean_controls(f, ui, &mut actions),
                    Some(ColumnFilter::Text(f)) => text_controls(f, ui, &mut actions),
                    None => {
                        ui.spinner();
                    }
                }
            }
            ui.separator();
            ui.horizontal(|ui| {
                if ui.link("Reset").clicked() {
                    actions.push(PanelAction::Reset);
                }
                if ui.button("Close").clicked() {
                    actions.push(PanelAction::Close);
                }
            });
        });

    for action in actions {
        apply(ctl, &open.field, action);
    }
    response.map(|r| r.response.rect)
}
