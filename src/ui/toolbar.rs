use std::path::{Path, PathBuf};

use eframe::egui;
use tracing::debug;

use crate::controller::{GridController, RowOperation};
use crate::transport::Transport;

fn row_button<T: Transport>(ctl: &mut GridController<T>, op: RowOperation, ui: &mut egui::Ui) {
    let toolbar = ctl.toolbar();
    let label = if toolbar.in_progress() == Some(op) {
        op.busy_label()
    } else {
        op.label()
    };
    let reason = toolbar.disabled_reason();

    let response = ui.add_enabled(reason.is_none(), egui::Button::new(label));
    let response = match reason {
        Some(reason) => response.on_disabled_hover_text(reason),
        None => response,
    };
    if response.clicked() {
        let result = match op {
            RowOperation::Add => ctl.add_row(),
            RowOperation::Remove => ctl.remove_row(),
        };
        // The controller already raised an alert for the rejection
        if let Err(e) = result {
            debug!(?op, error = %e, "row operation rejected");
        }
    }
}

/// Render the toolbar. Returns a file the user picked to open.
pub fn render_toolbar<T: Transport>(
    ctl: &mut GridController<T>,
    current_file: Option<&Path>,
    ui: &mut egui::Ui,
) -> Option<PathBuf> {
    let mut picked = None;
    ui.horizontal(|ui| {
        if ui.button("📂").on_hover_text("Open Data File").clicked() {
            picked = rfd::FileDialog::new()
                .add_filter("Data Files", &["csv", "parquet"])
                .pick_file();
        }

        if let Some(file) = current_file {
            ui.label(format!(
                "📄 {}",
                file.file_name().and_then(|n| n.to_str()).unwrap_or("Unknown")
            ))
            .on_hover_text(file.display().to_string());
        }

        if ctl.toolbar().visible {
            ui.separator();
            row_button(ctl, RowOperation::Add, ui);
            row_button(ctl, RowOperation::Remove, ui);
        }

        let view_len = ctl.data_view().len();
        if !ctl.columns().is_empty() {
            ui.separator();
            ui.label(format!("{} rows", view_len));
            if ctl.has_active_filter() {
                ui.weak("(filtered)");
            }
        }
    });
    picked
}
