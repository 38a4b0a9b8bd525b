//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
pub mod snapshot;

pub use app::ExplorerApp;
pub use chart_viewer::{ChartViewer, ChartViewerAction, Tab};
pub use control_panel::{ControlPanel, ControlPanelAction, SidebarMetrics};
pub use snapshot::{ViewSettings, ViewSnapshot};
