//! Filter, sort and viewport coordination for a windowed data grid whose rows
//! live in an out-of-process data source.
//!
//! The [`controller::GridController`] owns the client side: per-column
//! filters, the resident [`data_view::DataView`] window, sort and selection
//! state. It talks to a host through a [`transport::Transport`] using the
//! typed messages in [`protocol`]. [`host`] provides a reference host over an
//! in-memory table, and [`app`] an egui viewer wiring the two together.

pub mod app;
pub mod column;
pub mod constants;
pub mod controller;
pub mod data_view;
pub mod editors;
pub mod error;
pub mod filters;
pub mod format;
pub mod host;
pub mod logging;
pub mod options;
pub mod protocol;
pub mod schedule;
pub mod transport;
pub mod ui;
