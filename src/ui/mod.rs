mod alerts;
mod filter_panel;
mod grid_table;
mod toolbar;

pub use alerts::render_alerts;
pub use filter_panel::render_filter_panel;
pub use grid_table::{CellEdit, GridTableState, render_grid_table};
pub use toolbar::render_toolbar;
