use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// Role a module plays in the ownership hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Top-level root standing for the whole system.
    System,
    /// Pseudo-module standing for an entire grouping tag (a lane root).
    Layer,
    #[default]
    Module,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub id: String,
    pub name: String,
    pub layer: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub kind: NodeKind,
}

impl ViewNode {
    pub fn module(id: &str, name: &str, layer: &str, level: u32, parent_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            layer: layer.to_string(),
            level,
            parent_id: parent_id.map(str::to_string),
            kind: NodeKind::Module,
        }
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    Dependency,
    Interface,
    #[serde(alias = "dependency_file")]
    FileDependency,
    #[serde(other)]
    Other,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Dependency => "dependency",
            EdgeKind::Interface => "interface",
            EdgeKind::FileDependency => "file-dependency",
            EdgeKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEdge {
    pub id: String,
    pub src_id: String,
    pub dst_id: String,
    pub kind: EdgeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_edge_count")]
    pub count: u32,
}

fn default_edge_count() -> u32 {
    1
}

impl ViewEdge {
    pub fn new(id: &str, src_id: &str, dst_id: &str, kind: EdgeKind) -> Self {
        Self {
            id: id.to_string(),
            src_id: src_id.to_string(),
            dst_id: dst_id.to_string(),
            kind,
            label: String::new(),
            count: 1,
        }
    }
}

/// The flattened set of currently visible modules and the links between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewGraph {
    pub nodes: Vec<ViewNode>,
    #[serde(default)]
    pub edges: Vec<ViewEdge>,
    /// Preferred lane order; lanes not listed follow in first-appearance order.
    #[serde(default)]
    pub layers: Vec<String>,
}

impl ViewGraph {
    /// Grouping tags in lane order.
    pub fn lane_order(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let present: HashSet<&str> = self.nodes.iter().map(|node| node.layer.as_str()).collect();
        for layer in &self.layers {
            if present.contains(layer.as_str()) && seen.insert(layer.as_str()) {
                order.push(layer.clone());
            }
        }
        for node in &self.nodes {
            if seen.insert(node.layer.as_str()) {
                order.push(node.layer.clone());
            }
        }
        order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    #[serde(alias = "IN", alias = "In")]
    In,
    #[serde(alias = "OUT", alias = "Out")]
    Out,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub direction: PortDirection,
    #[serde(default)]
    pub protocol: String,
    pub name: String,
}

impl Port {
    pub fn new(id: &str, direction: PortDirection, protocol: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            direction,
            protocol: protocol.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpansionState {
    /// Ancestors of the current drill-down target, outermost first.
    pub focus_path_ids: Vec<String>,
    pub expanded_module_ids: BTreeSet<String>,
    pub selected_module_id: Option<String>,
}

/// A user drag (and optional resize) of one node or container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualOverride {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
}

impl ManualOverride {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            width: None,
            height: None,
        }
    }

    pub fn sized(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: Some(width),
            height: Some(height),
        }
    }
}

/// Everything one layout pass needs. The engine reads nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutInput {
    pub view: ViewGraph,
    /// Full module set used for ancestor lookups. Visible nodes are used
    /// when a module is missing here.
    pub hierarchy: Vec<ViewNode>,
    pub ports: BTreeMap<String, Vec<Port>>,
    pub summaries: BTreeMap<String, String>,
    pub summary_sources: BTreeMap<String, String>,
    pub expansion: ExpansionState,
    pub overrides: BTreeMap<String, ManualOverride>,
}

impl LayoutInput {
    pub fn new(view: ViewGraph) -> Self {
        Self {
            view,
            ..Default::default()
        }
    }
}

/// Ancestor-chain lookup over the module hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Lineage {
    records: BTreeMap<String, ViewNode>,
}

impl Lineage {
    pub fn new<'a>(
        hierarchy: impl IntoIterator<Item = &'a ViewNode>,
        visible: impl IntoIterator<Item = &'a ViewNode>,
    ) -> Self {
        let mut records = BTreeMap::new();
        for node in hierarchy {
            records.entry(node.id.clone()).or_insert_with(|| node.clone());
        }
        for node in visible {
            records.entry(node.id.clone()).or_insert_with(|| node.clone());
        }
        Self { records }
    }

    pub fn record(&self, id: &str) -> Option<&ViewNode> {
        self.records.get(id)
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.records.get(id).and_then(|node| node.parent_id.as_deref())
    }

    /// Strict ancestors of `id`, outermost first. A parent cycle ends the walk.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                log::debug!("parent cycle at {parent} while walking ancestors of {id}");
                break;
            }
            chain.push(parent.to_string());
            current = self.parent(parent);
        }
        chain.reverse();
        chain
    }

    /// `id` preceded by its strict ancestors.
    pub fn lineage(&self, id: &str) -> Vec<String> {
        let mut chain = self.ancestors(id);
        chain.push(id.to_string());
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_kind_accepts_legacy_file_dependency_tag() {
        let edge: ViewEdge = serde_json::from_str(
            r#"{"id":"e","src_id":"a","dst_id":"b","kind":"dependency_file"}"#,
        )
        .unwrap();
        assert_eq!(edge.kind, EdgeKind::FileDependency);
        assert_eq!(edge.count, 1);
        let other: ViewEdge =
            serde_json::from_str(r#"{"id":"e","src_id":"a","dst_id":"b","kind":"calls"}"#).unwrap();
        assert_eq!(other.kind, EdgeKind::Other);
    }

    #[test]
    fn lane_order_prefers_declared_layers() {
        let view = ViewGraph {
            nodes: vec![
                ViewNode::module("a", "a", "Backend", 2, None),
                ViewNode::module("b", "b", "Frontend", 2, None),
                ViewNode::module("c", "c", "Data", 2, None),
            ],
            edges: Vec::new(),
            layers: vec!["Frontend".to_string(), "Missing".to_string()],
        };
        assert_eq!(view.lane_order(), vec!["Frontend", "Backend", "Data"]);
    }

    #[test]
    fn ancestors_stop_at_parent_cycles() {
        let nodes = vec![
            ViewNode::module("a", "a", "L", 1, Some("b")),
            ViewNode::module("b", "b", "L", 1, Some("c")),
            ViewNode::module("c", "c", "L", 1, Some("a")),
        ];
        let lineage = Lineage::new(&nodes, std::iter::empty());
        assert_eq!(lineage.ancestors("a"), vec!["c", "b"]);
        assert_eq!(lineage.lineage("a"), vec!["c", "b", "a"]);
    }
}
