//! Logging setup and TUI table view.

mod dashboard;
mod logging;

pub use dashboard::{signal_style, Dashboard, DashboardState};
pub use logging::setup_logging;
