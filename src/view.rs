use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ir::{EdgeKind, LayoutInput, Port, PortDirection, ViewEdge, ViewGraph, ViewNode};

/// Port as stored in the architecture model, tagged with its owning module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulePort {
    pub id: String,
    pub module_id: String,
    pub name: String,
    #[serde(default)]
    pub protocol: String,
    pub direction: PortDirection,
}

/// Full module graph of a system, every drill level at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureModel {
    #[serde(default)]
    pub system_name: String,
    pub modules: Vec<ViewNode>,
    #[serde(default)]
    pub ports: Vec<ModulePort>,
    #[serde(default)]
    pub edges: Vec<ViewEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewLevel {
    /// One box per layer, edges folded to layer pairs.
    Layers,
    Modules,
    Files,
}

impl ViewLevel {
    pub fn module_level(self) -> u32 {
        match self {
            ViewLevel::Layers => 1,
            ViewLevel::Modules => 2,
            ViewLevel::Files => 3,
        }
    }
}

/// Visible nodes and edges for one drill level.
pub fn collect_view(model: &ArchitectureModel, level: ViewLevel) -> ViewGraph {
    let nodes: Vec<ViewNode> = model
        .modules
        .iter()
        .filter(|module| module.level == level.module_level())
        .cloned()
        .collect();
    let layers: Vec<String> = model
        .modules
        .iter()
        .filter(|module| module.level == 1)
        .map(|module| module.name.clone())
        .collect();

    let edges = match level {
        ViewLevel::Layers => layer_edges(model),
        ViewLevel::Modules | ViewLevel::Files => {
            let visible: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
            let kept: Vec<ViewEdge> = model
                .edges
                .iter()
                .filter(|edge| match level {
                    ViewLevel::Modules => {
                        matches!(edge.kind, EdgeKind::Dependency | EdgeKind::Interface)
                    }
                    _ => edge.kind == EdgeKind::FileDependency,
                })
                .filter(|edge| {
                    visible.contains(edge.src_id.as_str()) && visible.contains(edge.dst_id.as_str())
                })
                .cloned()
                .collect();
            aggregate_edges(&kept)
        }
    };

    ViewGraph {
        nodes,
        edges,
        layers,
    }
}

/// Folds every module edge onto the level-1 boxes of its two layers.
fn layer_edges(model: &ArchitectureModel) -> Vec<ViewEdge> {
    let by_id: HashMap<&str, &ViewNode> = model
        .modules
        .iter()
        .map(|module| (module.id.as_str(), module))
        .collect();
    let mut layer_boxes: HashMap<&str, &ViewNode> = HashMap::new();
    for module in model.modules.iter().filter(|module| module.level == 1) {
        layer_boxes.entry(module.name.as_str()).or_insert(module);
    }

    let mut folded = Vec::new();
    for edge in &model.edges {
        let (Some(src), Some(dst)) = (by_id.get(edge.src_id.as_str()), by_id.get(edge.dst_id.as_str()))
        else {
            continue;
        };
        let (Some(src_box), Some(dst_box)) =
            (layer_boxes.get(src.layer.as_str()), layer_boxes.get(dst.layer.as_str()))
        else {
            continue;
        };
        if src_box.id == dst_box.id {
            continue;
        }
        let mut folded_edge = ViewEdge::new(
            &format!("layers:{}->{}", src_box.id, dst_box.id),
            &src_box.id,
            &dst_box.id,
            EdgeKind::Dependency,
        );
        folded_edge.label = format!("{} -> {}", src.layer, dst.layer);
        folded_edge.count = edge.count;
        folded.push(folded_edge);
    }
    aggregate_edges(&folded)
}

/// Merges edges sharing (source, target, kind). Counts add up; the first
/// edge's id and label win. First-appearance order is kept.
pub fn aggregate_edges(edges: &[ViewEdge]) -> Vec<ViewEdge> {
    let mut index: HashMap<(&str, &str, EdgeKind), usize> = HashMap::new();
    let mut merged: Vec<ViewEdge> = Vec::new();
    for edge in edges {
        let key = (edge.src_id.as_str(), edge.dst_id.as_str(), edge.kind);
        match index.get(&key) {
            Some(&slot) => merged[slot].count += edge.count,
            None => {
                index.insert(key, merged.len());
                merged.push(edge.clone());
            }
        }
    }
    merged
}

pub fn ports_by_module(ports: &[ModulePort]) -> BTreeMap<String, Vec<Port>> {
    let mut grouped: BTreeMap<String, Vec<Port>> = BTreeMap::new();
    for port in ports {
        grouped
            .entry(port.module_id.clone())
            .or_default()
            .push(Port::new(&port.id, port.direction, &port.protocol, &port.name));
    }
    grouped
}

/// Layout input for one drill level with the model's full hierarchy and
/// ports attached. Summaries, expansion and overrides start empty.
pub fn layout_input(model: &ArchitectureModel, level: ViewLevel) -> LayoutInput {
    let mut input = LayoutInput::new(collect_view(model, level));
    input.hierarchy = model.modules.clone();
    input.ports = ports_by_module(&model.ports);
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ArchitectureModel {
        ArchitectureModel {
            system_name: "shop".into(),
            modules: vec![
                ViewNode::module("layer:web", "Web", "Web", 1, None),
                ViewNode::module("layer:core", "Core", "Core", 1, None),
                ViewNode::module("web/ui", "ui", "Web", 2, Some("layer:web")),
                ViewNode::module("core/api", "api", "Core", 2, Some("layer:core")),
                ViewNode::module("core/db", "db", "Core", 2, Some("layer:core")),
                ViewNode::module("core/api/users.py", "users.py", "Core", 3, Some("core/api")),
                ViewNode::module("core/db/pool.py", "pool.py", "Core", 3, Some("core/db")),
            ],
            ports: vec![
                ModulePort {
                    id: "p1".into(),
                    module_id: "core/api".into(),
                    name: "GET /users".into(),
                    protocol: "http".into(),
                    direction: PortDirection::In,
                },
                ModulePort {
                    id: "p2".into(),
                    module_id: "core/api".into(),
                    name: "db.query".into(),
                    protocol: "sql".into(),
                    direction: PortDirection::Out,
                },
            ],
            edges: vec![
                ViewEdge::new("e1", "web/ui", "core/api", EdgeKind::Interface),
                ViewEdge::new("e2", "core/api", "core/db", EdgeKind::Dependency),
                ViewEdge::new("e3", "web/ui", "core/api", EdgeKind::Interface),
                ViewEdge::new("e4", "core/api/users.py", "core/db/pool.py", EdgeKind::FileDependency),
                ViewEdge::new("e5", "web/ui", "nowhere", EdgeKind::Dependency),
            ],
        }
    }

    #[test]
    fn layer_view_folds_edges_onto_layer_boxes() {
        let view = collect_view(&model(), ViewLevel::Layers);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.layers, vec!["Web", "Core"]);
        assert_eq!(view.edges.len(), 1);
        let edge = &view.edges[0];
        assert_eq!(edge.src_id, "layer:web");
        assert_eq!(edge.dst_id, "layer:core");
        assert_eq!(edge.label, "Web -> Core");
        assert_eq!(edge.count, 2);
    }

    #[test]
    fn module_view_keeps_dependency_and_interface_edges() {
        let view = collect_view(&model(), ViewLevel::Modules);
        assert_eq!(view.nodes.len(), 3);
        let ids: Vec<&str> = view.edges.iter().map(|edge| edge.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
        assert_eq!(view.edges[0].count, 2);
    }

    #[test]
    fn file_view_keeps_file_edges_only() {
        let view = collect_view(&model(), ViewLevel::Files);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.edges.len(), 1);
        assert_eq!(view.edges[0].kind, EdgeKind::FileDependency);
    }

    #[test]
    fn ports_are_grouped_in_order() {
        let grouped = ports_by_module(&model().ports);
        let api = &grouped["core/api"];
        assert_eq!(api.len(), 2);
        assert_eq!(api[0].direction, PortDirection::In);
        assert_eq!(api[1].name, "db.query");

        let input = layout_input(&model(), ViewLevel::Modules);
        assert_eq!(input.hierarchy.len(), 7);
        assert_eq!(input.ports["core/api"].len(), 2);
    }
}
