//! egui viewer shell
//!
//! Drives a `GridController` against an in-process `HostWorker`. Each frame
//! drains the worker's pushes into the controller, fires elapsed debounces,
//! then renders.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use eframe::egui::{self, CentralPanel, TopBottomPanel};
use tracing::{error, info, warn};

use crate::controller::GridController;
use crate::filters::{DocumentEvent, PointerTarget};
use crate::host::{DataSet, HostWorker, WorkerRequest, WorkerResult};
use crate::options::GridSettings;
use crate::schedule::MonotonicClock;
use crate::transport::ChannelTransport;
use crate::ui::{self, GridTableState};

/// Frame interval while debounces may be pending
const TICK_INTERVAL: Duration = Duration::from_millis(50);

pub struct GridApp {
    worker: HostWorker,
    controller: GridController<ChannelTransport<WorkerRequest>>,
    table: GridTableState,
    current_file: Option<PathBuf>,
    /// Filter panel rect from the previous frame, for outside-click detection
    panel_rect: Option<egui::Rect>,
}

impl GridApp {
    /// Start with an empty host; `file` is loaded right away when given
    pub fn new(settings: GridSettings, file: Option<PathBuf>) -> Self {
        let mut app = Self::with_worker(HostWorker::spawn(), settings);
        if let Some(path) = file {
            app.open(path);
        }
        app
    }

    /// Serve an in-memory table
    pub fn with_dataset(settings: GridSettings, data: DataSet) -> Self {
        Self::with_worker(HostWorker::with_dataset(data), settings)
    }

    fn with_worker(worker: HostWorker, settings: GridSettings) -> Self {
        let controller = GridController::new(
            worker.transport(),
            Rc::new(MonotonicClock::new()),
            settings,
        );
        Self {
            worker,
            controller,
            table: GridTableState::default(),
            current_file: None,
            panel_rect: None,
        }
    }

    pub fn controller(&self) -> &GridController<ChannelTransport<WorkerRequest>> {
        &self.controller
    }

    pub fn open(&mut self, path: PathBuf) {
        self.table.edit = None;
        self.worker.load_file(path);
    }

    /// Feed everything the worker has produced into the controller
    fn drain_worker(&mut self) {
        profiling::scope!("GridApp::drain_worker");
        while let Some(result) = self.worker.poll() {
            match result {
                WorkerResult::Loaded { path, rows } => {
                    info!(path = %path.display(), rows, "file loaded");
                    self.current_file = Some(path);
                }
                WorkerResult::Error { msg } => {
                    error!(%msg, "host worker error");
                    self.controller.handle_host_message(crate::protocol::HostMessage::ShowError {
                        error_msg: msg,
                        triggered_by: None,
                    });
                }
                push @ WorkerResult::Push(_) => match push.into_host_message() {
                    Some(Ok(msg)) => self.controller.handle_host_message(msg),
                    Some(Err(e)) => warn!(error = %e, "undecodable host push"),
                    None => {}
                },
            }
        }
    }

    /// Escape and pointer presses dismiss the filter panel
    fn document_events(&mut self, ctx: &egui::Context) {
        if self.controller.panel().current().is_none() {
            return;
        }
        let (escape, press) = ctx.input(|i| {
            let press = i
                .pointer
                .any_pressed()
                .then(|| i.pointer.interact_pos())
                .flatten();
            (i.key_pressed(egui::Key::Escape), press)
        });
        if escape {
            self.controller.document_event(DocumentEvent::EscapePressed);
        }
        if let Some(pos) = press {
            let target = if self.panel_rect.is_some_and(|r| r.contains(pos)) {
                PointerTarget::InsidePanel
            } else if ctx.is_pointer_over_area() {
                PointerTarget::ChildOverlay
            } else {
                PointerTarget::Outside
            };
            self.controller.document_event(DocumentEvent::PointerDown(target));
        }
    }

    fn dropped_file(ctx: &egui::Context) -> Option<PathBuf> {
        ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()))
    }
}

impl eframe::App for GridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::finish_frame!();
        profiling::scope!("GridApp::update");

        self.drain_worker();
        self.controller.tick();
        self.document_events(ctx);

        if let Some(path) = Self::dropped_file(ctx) {
            self.open(path);
        }

        TopBottomPanel::top("toolbar").show(ctx, |ui| {
            if let Some(path) =
                ui::render_toolbar(&mut self.controller, self.current_file.as_deref(), ui)
            {
                self.open(path);
            }
        });

        CentralPanel::default().show(ctx, |ui| {
            ui::render_grid_table(&mut self.controller, &mut self.table, ui);
        });

        self.panel_rect = ui::render_filter_panel(&mut self.controller, ctx);
        ui::render_alerts(&mut self.controller, ctx);

        ctx.request_repaint_after(TICK_INTERVAL);
    }
}
