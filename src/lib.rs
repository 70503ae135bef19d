pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod view;

pub use config::{LayoutConfig, load_config};
pub use ir::{ExpansionState, LayoutInput, ManualOverride, ViewEdge, ViewGraph, ViewNode};
pub use layout::{LayoutResult, compute_layout};
pub use view::{ArchitectureModel, ViewLevel, collect_view};
