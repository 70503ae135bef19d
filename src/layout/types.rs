use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Insets;
use crate::ir::{EdgeKind, NodeKind};

pub type Point = (f32, f32);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn inflate(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// The rect grown outward by `insets` on each side.
    pub fn outset(&self, insets: &Insets) -> Rect {
        Rect::new(
            self.x - insets.left,
            self.y - insets.top,
            self.width + insets.horizontal(),
            self.height + insets.vertical(),
        )
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Strict interior overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Side of a box an edge leaves or enters through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLayout {
    pub id: String,
    pub name: String,
    pub layer: String,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Auto-computed size; manual resizes never go below it.
    pub min_width: f32,
    pub min_height: f32,
    pub port_start_y: f32,
    pub in_ports: usize,
    pub out_ports: usize,
    pub summary_lines: Vec<String>,
    /// Direct owning container, if any.
    pub owner: Option<String>,
}

impl NodeLayout {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.port_start_y += rect.y - self.y;
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerLayout {
    pub id: String,
    pub name: String,
    pub layer: String,
    pub parent_id: Option<String>,
    pub level: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
    /// Direct members: node ids and nested container ids.
    pub members: Vec<String>,
    pub member_count: usize,
}

impl ContainerLayout {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneLayout {
    pub layer: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub members: Vec<String>,
}

impl LaneLayout {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeLayout {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub label: String,
    pub count: u32,
    pub path: Vec<Point>,
    pub label_x: f32,
    pub label_y: f32,
    pub source_side: Side,
    pub target_side: Side,
    /// Where the route may first turn after leaving the source. Lies outside
    /// any container the route has to leave.
    pub source_gate: Point,
    pub target_gate: Point,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub width: f32,
    pub height: f32,
    pub nodes: BTreeMap<String, NodeLayout>,
    pub containers: BTreeMap<String, ContainerLayout>,
    pub lanes: Vec<LaneLayout>,
    pub edges: Vec<EdgeLayout>,
    /// Edges skipped because an endpoint is not a visible node.
    pub dropped_edges: Vec<String>,
}

impl LayoutResult {
    /// Containers owning `id`, innermost first.
    pub fn owner_chain(&self, id: &str) -> Vec<&ContainerLayout> {
        let mut chain = Vec::new();
        let mut current = match self.nodes.get(id) {
            Some(node) => node.owner.as_deref(),
            None => self
                .containers
                .get(id)
                .and_then(|container| container.parent_id.as_deref()),
        };
        while let Some(owner_id) = current {
            let Some(container) = self.containers.get(owner_id) else {
                break;
            };
            if chain.len() > self.containers.len() {
                break;
            }
            chain.push(container);
            current = container.parent_id.as_deref();
        }
        chain
    }

    pub fn item_rect(&self, id: &str) -> Option<Rect> {
        self.nodes
            .get(id)
            .map(NodeLayout::rect)
            .or_else(|| self.containers.get(id).map(ContainerLayout::rect))
    }
}
