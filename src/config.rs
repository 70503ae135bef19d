use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Per-side spacing between a box and the box that encloses it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Insets {
    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    fn is_valid(&self) -> bool {
        [self.left, self.right, self.top, self.bottom]
            .iter()
            .all(|value| value.is_finite() && *value >= 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSizingConfig {
    pub min_width: f32,
    pub max_width: f32,
    pub base_height: f32,
    pub port_line_height: f32,
    pub port_start_offset: f32,
    pub padding_x: f32,
    pub title_font_size: f32,
    pub port_font_size: f32,
    pub summary_font_size: f32,
    pub summary_line_height: f32,
    pub summary_chars_per_line: usize,
    pub max_summary_lines: usize,
    pub port_label_max_chars: usize,
    pub container_header_height: f32,
}

impl Default for NodeSizingConfig {
    fn default() -> Self {
        Self {
            min_width: 180.0,
            max_width: 340.0,
            base_height: 70.0,
            port_line_height: 20.0,
            port_start_offset: 62.0,
            padding_x: 12.0,
            title_font_size: 15.0,
            port_font_size: 12.0,
            summary_font_size: 12.0,
            summary_line_height: 16.0,
            summary_chars_per_line: 42,
            max_summary_lines: 3,
            port_label_max_chars: 28,
            container_header_height: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingConfig {
    pub gap_x: f32,
    pub gap_y: f32,
    pub max_columns: usize,
    pub target_aspect: f32,
    pub aspect_weight: f32,
    pub area_weight: f32,
    pub area_unit: f32,
    pub column_weight: f32,
    /// Horizontal gap between side-by-side lane bands.
    pub group_gap: f32,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            gap_x: 48.0,
            gap_y: 32.0,
            max_columns: 4,
            target_aspect: 1.6,
            aspect_weight: 100.0,
            area_weight: 1.0,
            area_unit: 10_000.0,
            column_weight: 2.0,
            group_gap: 80.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainmentConfig {
    /// Space kept between a node and every container that owns it. The top
    /// side reserves room for the container header.
    pub node_margin: Insets,
    /// Space kept between a nested container and its parent.
    pub container_margin: Insets,
    pub lane_margin: f32,
    pub canvas_padding: f32,
    /// Gap enforced between siblings pushed apart after manual edits.
    pub sibling_gap: f32,
}

impl Default for ContainmentConfig {
    fn default() -> Self {
        Self {
            node_margin: Insets::new(16.0, 16.0, 36.0, 16.0),
            container_margin: Insets::new(14.0, 14.0, 30.0, 14.0),
            lane_margin: 12.0,
            canvas_padding: 40.0,
            sibling_gap: 16.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub gate_inset: f32,
    pub stub_length: f32,
    pub boundary_clearance: f32,
    pub obstacle_margin: f32,
    pub intersection_penalty: f32,
    pub bend_penalty: f32,
    pub deviation_weight: f32,
    pub hash_jitter: f32,
    pub kind_bias: f32,
    pub corridor_step: f32,
    pub corridor_steps: usize,
    pub outer_row_offset: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            gate_inset: 8.0,
            stub_length: 14.0,
            boundary_clearance: 18.0,
            obstacle_margin: 8.0,
            intersection_penalty: 10_000.0,
            bend_penalty: 24.0,
            deviation_weight: 0.6,
            hash_jitter: 10.0,
            kind_bias: 8.0,
            corridor_step: 22.0,
            corridor_steps: 2,
            outer_row_offset: 36.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node: NodeSizingConfig,
    pub packing: PackingConfig,
    pub containment: ContainmentConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("packing gap `{name}` must be a finite non-negative number, got {value}")]
    NonPositiveGap { name: &'static str, value: f32 },
    #[error("max_columns must be at least 1")]
    InvalidColumnCount,
    #[error("target_aspect must be a finite positive number, got {0}")]
    InvalidAspect(f32),
    #[error("lane_margin {lane_margin} leaves no room between bands separated by {group_gap}")]
    LaneMarginTooWide { lane_margin: f32, group_gap: f32 },
    #[error("margin `{0}` must be finite and non-negative")]
    NegativeMargin(&'static str),
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("gap_x", self.packing.gap_x),
            ("gap_y", self.packing.gap_y),
            ("group_gap", self.packing.group_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NonPositiveGap { name, value });
            }
        }
        if self.packing.max_columns == 0 {
            return Err(ConfigError::InvalidColumnCount);
        }
        let aspect = self.packing.target_aspect;
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(ConfigError::InvalidAspect(aspect));
        }
        if !self.containment.node_margin.is_valid() {
            return Err(ConfigError::NegativeMargin("node_margin"));
        }
        if !self.containment.container_margin.is_valid() {
            return Err(ConfigError::NegativeMargin("container_margin"));
        }
        let lane_margin = self.containment.lane_margin;
        if !lane_margin.is_finite() || lane_margin < 0.0 {
            return Err(ConfigError::NegativeMargin("lane_margin"));
        }
        if lane_margin * 2.0 >= self.packing.group_gap && self.packing.group_gap > 0.0 {
            return Err(ConfigError::LaneMarginTooWide {
                lane_margin,
                group_gap: self.packing.group_gap,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InsetsFile {
    left: Option<f32>,
    right: Option<f32>,
    top: Option<f32>,
    bottom: Option<f32>,
}

impl InsetsFile {
    fn merge_into(self, target: &mut Insets) {
        if let Some(v) = self.left {
            target.left = v;
        }
        if let Some(v) = self.right {
            target.right = v;
        }
        if let Some(v) = self.top {
            target.top = v;
        }
        if let Some(v) = self.bottom {
            target.bottom = v;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct NodeConfigFile {
    min_width: Option<f32>,
    max_width: Option<f32>,
    base_height: Option<f32>,
    port_line_height: Option<f32>,
    port_start_offset: Option<f32>,
    padding_x: Option<f32>,
    title_font_size: Option<f32>,
    port_font_size: Option<f32>,
    summary_font_size: Option<f32>,
    summary_line_height: Option<f32>,
    summary_chars_per_line: Option<usize>,
    max_summary_lines: Option<usize>,
    port_label_max_chars: Option<usize>,
    container_header_height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PackingConfigFile {
    gap_x: Option<f32>,
    gap_y: Option<f32>,
    max_columns: Option<usize>,
    target_aspect: Option<f32>,
    aspect_weight: Option<f32>,
    area_weight: Option<f32>,
    area_unit: Option<f32>,
    column_weight: Option<f32>,
    group_gap: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ContainmentConfigFile {
    node_margin: Option<InsetsFile>,
    container_margin: Option<InsetsFile>,
    lane_margin: Option<f32>,
    canvas_padding: Option<f32>,
    sibling_gap: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    gate_inset: Option<f32>,
    stub_length: Option<f32>,
    boundary_clearance: Option<f32>,
    obstacle_margin: Option<f32>,
    intersection_penalty: Option<f32>,
    bend_penalty: Option<f32>,
    deviation_weight: Option<f32>,
    hash_jitter: Option<f32>,
    kind_bias: Option<f32>,
    corridor_step: Option<f32>,
    corridor_steps: Option<usize>,
    outer_row_offset: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    node: Option<NodeConfigFile>,
    packing: Option<PackingConfigFile>,
    containment: Option<ContainmentConfigFile>,
    routing: Option<RoutingConfigFile>,
}

/// Loads a layout config from a JSON or JSON5 file, merging it over the
/// defaults. `None` returns the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<LayoutConfig> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = LayoutConfig::default();

    if let Some(node) = parsed.node {
        let target = &mut config.node;
        if let Some(v) = node.min_width {
            target.min_width = v;
        }
        if let Some(v) = node.max_width {
            target.max_width = v;
        }
        if let Some(v) = node.base_height {
            target.base_height = v;
        }
        if let Some(v) = node.port_line_height {
            target.port_line_height = v;
        }
        if let Some(v) = node.port_start_offset {
            target.port_start_offset = v;
        }
        if let Some(v) = node.padding_x {
            target.padding_x = v;
        }
        if let Some(v) = node.title_font_size {
            target.title_font_size = v;
        }
        if let Some(v) = node.port_font_size {
            target.port_font_size = v;
        }
        if let Some(v) = node.summary_font_size {
            target.summary_font_size = v;
        }
        if let Some(v) = node.summary_line_height {
            target.summary_line_height = v;
        }
        if let Some(v) = node.summary_chars_per_line {
            target.summary_chars_per_line = v;
        }
        if let Some(v) = node.max_summary_lines {
            target.max_summary_lines = v;
        }
        if let Some(v) = node.port_label_max_chars {
            target.port_label_max_chars = v;
        }
        if let Some(v) = node.container_header_height {
            target.container_header_height = v;
        }
    }

    if let Some(packing) = parsed.packing {
        let target = &mut config.packing;
        if let Some(v) = packing.gap_x {
            target.gap_x = v;
        }
        if let Some(v) = packing.gap_y {
            target.gap_y = v;
        }
        if let Some(v) = packing.max_columns {
            target.max_columns = v;
        }
        if let Some(v) = packing.target_aspect {
            target.target_aspect = v;
        }
        if let Some(v) = packing.aspect_weight {
            target.aspect_weight = v;
        }
        if let Some(v) = packing.area_weight {
            target.area_weight = v;
        }
        if let Some(v) = packing.area_unit {
            target.area_unit = v;
        }
        if let Some(v) = packing.column_weight {
            target.column_weight = v;
        }
        if let Some(v) = packing.group_gap {
            target.group_gap = v;
        }
    }

    if let Some(containment) = parsed.containment {
        let target = &mut config.containment;
        if let Some(v) = containment.node_margin {
            v.merge_into(&mut target.node_margin);
        }
        if let Some(v) = containment.container_margin {
            v.merge_into(&mut target.container_margin);
        }
        if let Some(v) = containment.lane_margin {
            target.lane_margin = v;
        }
        if let Some(v) = containment.canvas_padding {
            target.canvas_padding = v;
        }
        if let Some(v) = containment.sibling_gap {
            target.sibling_gap = v;
        }
    }

    if let Some(routing) = parsed.routing {
        let target = &mut config.routing;
        if let Some(v) = routing.gate_inset {
            target.gate_inset = v;
        }
        if let Some(v) = routing.stub_length {
            target.stub_length = v;
        }
        if let Some(v) = routing.boundary_clearance {
            target.boundary_clearance = v;
        }
        if let Some(v) = routing.obstacle_margin {
            target.obstacle_margin = v;
        }
        if let Some(v) = routing.intersection_penalty {
            target.intersection_penalty = v;
        }
        if let Some(v) = routing.bend_penalty {
            target.bend_penalty = v;
        }
        if let Some(v) = routing.deviation_weight {
            target.deviation_weight = v;
        }
        if let Some(v) = routing.hash_jitter {
            target.hash_jitter = v;
        }
        if let Some(v) = routing.kind_bias {
            target.kind_bias = v;
        }
        if let Some(v) = routing.corridor_step {
            target.corridor_step = v;
        }
        if let Some(v) = routing.corridor_steps {
            target.corridor_steps = v;
        }
        if let Some(v) = routing.outer_row_offset {
            target.outer_row_offset = v;
        }
    }

    config.validate()?;
    Ok(config)
}
