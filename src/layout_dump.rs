use crate::layout::{LayoutResult, Side};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Flat, rounded snapshot of a layout for visual-regression diffs.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub lanes: Vec<LaneDump>,
    pub containers: Vec<ContainerDump>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub dropped_edges: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LaneDump {
    pub layer: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct ContainerDump {
    pub id: String,
    pub parent_id: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub member_count: usize,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub owner: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub port_start_y: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub source_side: Side,
    pub target_side: Side,
    pub points: Vec<[f32; 2]>,
    pub label: [f32; 2],
}

/// Two decimals keep dumps stable across platforms' float printing.
fn round(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

impl LayoutDump {
    pub fn from_layout(layout: &LayoutResult) -> Self {
        let lanes = layout
            .lanes
            .iter()
            .map(|lane| LaneDump {
                layer: lane.layer.clone(),
                x: round(lane.x),
                y: round(lane.y),
                width: round(lane.width),
                height: round(lane.height),
            })
            .collect();

        let containers = layout
            .containers
            .values()
            .map(|container| ContainerDump {
                id: container.id.clone(),
                parent_id: container.parent_id.clone(),
                x: round(container.x),
                y: round(container.y),
                width: round(container.width),
                height: round(container.height),
                member_count: container.member_count,
            })
            .collect();

        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                owner: node.owner.clone(),
                x: round(node.x),
                y: round(node.y),
                width: round(node.width),
                height: round(node.height),
                port_start_y: round(node.port_start_y),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                from: edge.source.clone(),
                to: edge.target.clone(),
                source_side: edge.source_side,
                target_side: edge.target_side,
                points: edge.path.iter().map(|(x, y)| [round(*x), round(*y)]).collect(),
                label: [round(edge.label_x), round(edge.label_y)],
            })
            .collect();

        LayoutDump {
            width: round(layout.width),
            height: round(layout.height),
            lanes,
            containers,
            nodes,
            edges,
            dropped_edges: layout.dropped_edges.clone(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &LayoutResult) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
