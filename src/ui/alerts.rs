use eframe::egui;

use crate::controller::GridController;
use crate::transport::Transport;

/// Modal window for the oldest queued alert
pub fn render_alerts<T: Transport>(ctl: &mut GridController<T>, ctx: &egui::Context) {
    let Some(alert) = ctl.alerts().next().cloned() else {
        return;
    };

    let mut dismissed = false;
    egui::Window::new(format!("⚠ {}", alert.title))
        .id(egui::Id::new("grid_alert"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(&alert.message);
            ui.separator();
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed || ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
        ctl.dismiss_alert();
    }
}
