mod containment;
mod hierarchy;
mod packing;
mod ranking;
mod routing;
mod text;
pub(crate) mod types;

pub use types::*;

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::{Insets, LayoutConfig};
use crate::ir::{LayoutInput, Lineage, ViewEdge, ViewNode};

use containment::{apply_overrides, canvas_size, enforce_containment, fit_lanes, normalize, settle};
use hierarchy::{ContainerDef, ContainerTree, build_container_tree};
use packing::{GroupedPacking, ItemKind, PackItem, pack_grouped};
use ranking::{RankHint, compare_hints, compute_rank_hints};
use routing::route_edges;
use text::{measure_node, text_width};

const NO_HINT: RankHint = RankHint { rank: 0, degree: 0 };

/// Lays out one view: measures nodes, nests the expanded containers, packs
/// everything bottom-up into lanes, applies manual overrides, enforces
/// containment and routes the edges. Pure and deterministic.
pub fn compute_layout(input: &LayoutInput, config: &LayoutConfig) -> LayoutResult {
    let visible = unique_nodes(&input.view.nodes);
    let lineage = Lineage::new(&input.hierarchy, &visible);
    let tree = build_container_tree(&visible, &lineage, &input.expansion);
    let lanes = input.view.lane_order();
    let lane_index: HashMap<&str, usize> = lanes
        .iter()
        .enumerate()
        .map(|(idx, layer)| (layer.as_str(), idx))
        .collect();

    let mut result = LayoutResult::default();
    for node in &visible {
        let owner = tree.node_owner.get(&node.id).cloned();
        result
            .nodes
            .insert(node.id.clone(), measure_view_node(node, input, owner, config));
    }

    let hints = rank_hints(&visible, &input.view.edges, &lanes);
    let mut planner = Planner::new(config, &tree, &result, hints, &lane_index);

    let mut interiors: BTreeMap<String, GroupedPacking> = BTreeMap::new();
    for def in tree.deepest_first() {
        let packing = planner.pack(&def.members());
        let (width, height) = container_size(def, &packing, config);
        planner.sizes.insert(def.id.clone(), (width, height));
        let member_count = tree
            .descendants(&def.id)
            .iter()
            .filter(|id| result.nodes.contains_key(*id))
            .count();
        result.containers.insert(
            def.id.clone(),
            ContainerLayout {
                id: def.id.clone(),
                name: def.name.clone(),
                layer: def.layer.clone(),
                parent_id: def.parent_id.clone(),
                level: def.level,
                x: 0.0,
                y: 0.0,
                width,
                height,
                min_width: width,
                min_height: height,
                members: def.members(),
                member_count,
            },
        );
        interiors.insert(def.id.clone(), packing);
    }

    let mut top_ids: Vec<String> = tree.roots().into_iter().map(|def| def.id.clone()).collect();
    top_ids.extend(
        result
            .nodes
            .values()
            .filter(|node| node.owner.is_none())
            .map(|node| node.id.clone()),
    );
    let top = planner.pack(&top_ids);
    let origin = config.containment.canvas_padding + content_inset(config);
    for (id, (x, y)) in &top.offsets {
        place_subtree(
            &mut result,
            &interiors,
            id,
            origin + x,
            origin + y,
            &config.containment.node_margin,
        );
    }

    let pinned = apply_overrides(&mut result, &tree, &input.overrides);
    settle(&mut result, &tree, &pinned, &config.containment);
    enforce_containment(&mut result, &config.containment);
    fit_lanes(&mut result, &lanes, config.containment.lane_margin);

    let (edges, dropped) = route_edges(&result, &input.view.edges, &tree, &config.routing);
    result.edges = edges;
    result.dropped_edges = dropped;
    normalize(&mut result, config.containment.canvas_padding);

    let (width, height) = canvas_size(&result, config.containment.canvas_padding);
    result.width = width;
    result.height = height;
    result
}

fn unique_nodes(nodes: &[ViewNode]) -> Vec<ViewNode> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        if seen.insert(node.id.as_str()) {
            out.push(node.clone());
        } else {
            log::debug!("ignoring duplicate visible node {}", node.id);
        }
    }
    out
}

fn measure_view_node(
    node: &ViewNode,
    input: &LayoutInput,
    owner: Option<String>,
    config: &LayoutConfig,
) -> NodeLayout {
    let ports = input.ports.get(&node.id).map(Vec::as_slice).unwrap_or(&[]);
    let metrics = measure_node(
        &node.name,
        input.summaries.get(&node.id).map(String::as_str),
        input.summary_sources.get(&node.id).map(String::as_str),
        ports,
        &config.node,
    );
    NodeLayout {
        id: node.id.clone(),
        name: node.name.clone(),
        layer: node.layer.clone(),
        kind: node.kind,
        x: 0.0,
        y: 0.0,
        width: metrics.width,
        height: metrics.height,
        min_width: metrics.width,
        min_height: metrics.height,
        port_start_y: metrics.port_offset,
        in_ports: metrics.in_ports,
        out_ports: metrics.out_ports,
        summary_lines: metrics.summary_lines,
        owner,
    }
}

/// Rank hints computed lane by lane; edges crossing lanes do not count.
fn rank_hints(visible: &[ViewNode], edges: &[ViewEdge], lanes: &[String]) -> BTreeMap<String, RankHint> {
    let mut hints = BTreeMap::new();
    for lane in lanes {
        let members: Vec<&ViewNode> = visible.iter().filter(|node| &node.layer == lane).collect();
        hints.extend(compute_rank_hints(&members, edges));
    }
    hints
}

/// Room kept above and left of the packed content for lane margins and
/// edge detours, so an undisturbed layout never has to be shifted.
fn content_inset(config: &LayoutConfig) -> f32 {
    let routing = &config.routing;
    config
        .containment
        .lane_margin
        .max(routing.stub_length)
        .max(routing.outer_row_offset)
        .max(routing.boundary_clearance + routing.hash_jitter + routing.kind_bias)
}

fn container_size(def: &ContainerDef, packing: &GroupedPacking, config: &LayoutConfig) -> (f32, f32) {
    let margin = &config.containment.node_margin;
    let header = text_width(&def.name, config.node.title_font_size) + config.node.padding_x * 2.0;
    let width = (packing.width + margin.horizontal()).max(header);
    let height = if packing.offsets.is_empty() {
        margin.vertical() + config.node.container_header_height
    } else {
        packing.height + margin.vertical()
    };
    (width, height)
}

/// Moves an item to (x, y) and lays its interior out below it.
fn place_subtree(
    result: &mut LayoutResult,
    interiors: &BTreeMap<String, GroupedPacking>,
    id: &str,
    x: f32,
    y: f32,
    margin: &Insets,
) {
    let mut stack = vec![(id.to_string(), x, y)];
    while let Some((id, x, y)) = stack.pop() {
        if let Some(node) = result.nodes.get_mut(&id) {
            let rect = node.rect();
            node.set_rect(Rect::new(x, y, rect.width, rect.height));
            continue;
        }
        let Some(container) = result.containers.get_mut(&id) else {
            continue;
        };
        container.x = x;
        container.y = y;
        if let Some(packing) = interiors.get(&id) {
            for (child, (ox, oy)) in &packing.offsets {
                stack.push((child.clone(), x + margin.left + ox, y + margin.top + oy));
            }
        }
    }
}

/// Sizes, lanes and sort keys for every packable item.
struct Planner<'a> {
    config: &'a LayoutConfig,
    tree: &'a ContainerTree,
    hints: BTreeMap<String, RankHint>,
    groups: HashMap<String, usize>,
    names: HashMap<String, String>,
    sizes: HashMap<String, (f32, f32)>,
}

impl<'a> Planner<'a> {
    fn new(
        config: &'a LayoutConfig,
        tree: &'a ContainerTree,
        result: &LayoutResult,
        mut hints: BTreeMap<String, RankHint>,
        lane_index: &HashMap<&str, usize>,
    ) -> Self {
        let mut groups = HashMap::new();
        let mut names = HashMap::new();
        let mut sizes = HashMap::new();
        for node in result.nodes.values() {
            groups.insert(node.id.clone(), lane_index.get(node.layer.as_str()).copied().unwrap_or(0));
            names.insert(node.id.clone(), node.name.clone());
            sizes.insert(node.id.clone(), (node.width, node.height));
        }

        for def in tree.containers.values() {
            let inside: Vec<String> = tree
                .descendants(&def.id)
                .into_iter()
                .filter(|id| result.nodes.contains_key(id))
                .collect();
            let group = lane_index
                .get(def.layer.as_str())
                .copied()
                .or_else(|| inside.iter().filter_map(|id| groups.get(id).copied()).min())
                .unwrap_or(0);
            let hint = inside
                .iter()
                .filter_map(|id| hints.get(id))
                .fold(None, |acc: Option<RankHint>, hint| {
                    Some(match acc {
                        Some(acc) => RankHint {
                            rank: acc.rank.min(hint.rank),
                            degree: acc.degree + hint.degree,
                        },
                        None => *hint,
                    })
                })
                .unwrap_or_default();
            groups.insert(def.id.clone(), group);
            names.insert(def.id.clone(), def.name.clone());
            hints.insert(def.id.clone(), hint);
        }

        Self {
            config,
            tree,
            hints,
            groups,
            names,
            sizes,
        }
    }

    fn group(&self, id: &str) -> usize {
        self.groups.get(id).copied().unwrap_or(0)
    }

    fn is_container(&self, id: &str) -> bool {
        self.tree.containers.contains_key(id)
    }

    fn hint(&self, id: &str) -> &RankHint {
        self.hints.get(id).unwrap_or(&NO_HINT)
    }

    fn name<'b>(&'b self, id: &'b str) -> &'b str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }

    fn pack(&self, ids: &[String]) -> GroupedPacking {
        let mut ordered: Vec<&String> = ids.iter().collect();
        ordered.sort_by(|a, b| {
            compare_hints(
                (self.hint(a), self.is_container(a), self.name(a)),
                (self.hint(b), self.is_container(b), self.name(b)),
            )
            .then_with(|| a.cmp(b))
        });
        let count = ordered.len();
        let items: Vec<PackItem> = ordered
            .into_iter()
            .enumerate()
            .filter_map(|(pos, id)| {
                let &(width, height) = self.sizes.get(id)?;
                Some(PackItem {
                    id: id.clone(),
                    width,
                    height,
                    group: self.group(id),
                    kind: if self.is_container(id) {
                        ItemKind::Container
                    } else {
                        ItemKind::Node
                    },
                    sort_rank: (count - pos) as i64,
                    sort_name: self.name(id).to_string(),
                })
            })
            .collect();
        pack_grouped(&items, &self.config.packing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EdgeKind, ExpansionState, ManualOverride, NodeKind, ViewGraph};

    fn view() -> ViewGraph {
        ViewGraph {
            nodes: vec![
                ViewNode::module("web/ui", "ui", "Web", 2, Some("layer:web")),
                ViewNode::module("core/api", "api", "Core", 2, Some("core")),
                ViewNode::module("core/db", "db", "Core", 2, Some("core")),
                ViewNode::module("core/jobs", "jobs", "Core", 2, Some("core")),
            ],
            edges: vec![
                ViewEdge::new("e1", "web/ui", "core/api", EdgeKind::Interface),
                ViewEdge::new("e2", "core/api", "core/db", EdgeKind::Dependency),
                ViewEdge::new("e3", "core/jobs", "core/db", EdgeKind::Dependency),
            ],
            layers: vec!["Web".into(), "Core".into()],
        }
    }

    fn input() -> LayoutInput {
        let mut input = LayoutInput::new(view());
        input.hierarchy = vec![
            ViewNode::module("layer:web", "Web", "Web", 1, None).with_kind(NodeKind::Layer),
            ViewNode::module("layer:core", "Core", "Core", 1, None).with_kind(NodeKind::Layer),
            ViewNode::module("core", "core", "Core", 1, Some("layer:core")),
        ];
        input.expansion = ExpansionState {
            expanded_module_ids: ["core".to_string()].into_iter().collect(),
            ..Default::default()
        };
        input
    }

    #[test]
    fn lanes_follow_declared_layer_order() {
        let result = compute_layout(&input(), &LayoutConfig::default());
        let layers: Vec<&str> = result.lanes.iter().map(|lane| lane.layer.as_str()).collect();
        assert_eq!(layers, vec!["Web", "Core"]);
        assert!(result.lanes[0].x + result.lanes[0].width <= result.lanes[1].x);
        assert_eq!(result.lanes[0].members, vec!["web/ui"]);
        assert_eq!(result.lanes[1].members, vec!["core", "core/api", "core/db", "core/jobs"]);
    }

    #[test]
    fn expanded_module_becomes_a_container() {
        let result = compute_layout(&input(), &LayoutConfig::default());
        let core = &result.containers["core"];
        assert_eq!(core.member_count, 3);
        assert_eq!(result.nodes["core/db"].owner.as_deref(), Some("core"));
        assert_eq!(result.nodes["web/ui"].owner, None);
        for id in ["core/api", "core/db", "core/jobs"] {
            assert!(core.rect().contains_rect(&result.nodes[id].rect()));
        }
        assert_eq!(result.edges.len(), 3);
    }

    #[test]
    fn identical_inputs_give_identical_layouts() {
        let config = LayoutConfig::default();
        let mut input = input();
        input.overrides.insert("core/db".into(), ManualOverride::at(900.0, 40.0));
        let first = serde_json::to_string(&compute_layout(&input, &config)).unwrap_or_default();
        let second = serde_json::to_string(&compute_layout(&input, &config)).unwrap_or_default();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_view_yields_padded_empty_canvas() {
        let result = compute_layout(&LayoutInput::default(), &LayoutConfig::default());
        assert!(result.nodes.is_empty());
        assert!(result.lanes.is_empty());
        assert_eq!(result.width, 80.0);
        assert_eq!(result.height, 80.0);
    }
}
