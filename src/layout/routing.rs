use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::RoutingConfig;
use crate::ir::{EdgeKind, ViewEdge};

use super::hierarchy::ContainerTree;
use super::types::{EdgeLayout, LayoutResult, NodeLayout, Point, Rect, Side};

const EPS: f32 = 1e-4;

struct RouteCandidate {
    points: Vec<Point>,
    score: f32,
    corridor: Option<f32>,
}

/// One (node, side) attachment request, ordered by where the far end sits.
struct SlotRequest {
    edge_idx: usize,
    end: End,
    far_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum End {
    Source,
    Target,
}

/// Routes every edge whose endpoints are both laid-out nodes. Returns the
/// routed edges in input order and the ids of the edges that were skipped.
pub(crate) fn route_edges(
    result: &LayoutResult,
    edges: &[ViewEdge],
    tree: &ContainerTree,
    config: &RoutingConfig,
) -> (Vec<EdgeLayout>, Vec<String>) {
    let mut dropped = Vec::new();
    let mut routable: Vec<(&ViewEdge, &NodeLayout, &NodeLayout)> = Vec::new();
    for edge in edges {
        match (result.nodes.get(&edge.src_id), result.nodes.get(&edge.dst_id)) {
            (Some(src), Some(dst)) => routable.push((edge, src, dst)),
            _ => {
                log::debug!(
                    "dropping edge {} ({} -> {}): endpoint is not visible",
                    edge.id,
                    edge.src_id,
                    edge.dst_id
                );
                dropped.push(edge.id.clone());
            }
        }
    }

    let sides: Vec<(Side, Side)> = routable
        .iter()
        .map(|(_, src, dst)| travel_sides(src, dst))
        .collect();
    let gates = assign_gates(&routable, &sides, config);

    let descendants: HashMap<&str, HashSet<String>> = tree
        .containers
        .keys()
        .map(|id| (id.as_str(), tree.descendants(id)))
        .collect();
    let obstacles: Vec<(&str, Rect)> = result
        .nodes
        .values()
        .map(|node| (node.id.as_str(), node.rect().inflate(config.obstacle_margin)))
        .collect();

    let mut routed = Vec::with_capacity(routable.len());
    for (idx, (edge, src, dst)) in routable.iter().enumerate() {
        let (source_side, target_side) = sides[idx];
        let ys = gates.get(&(idx, End::Source)).copied().unwrap_or_else(|| src.rect().center_y());
        let ye = gates.get(&(idx, End::Target)).copied().unwrap_or_else(|| dst.rect().center_y());

        if src.id == dst.id {
            let path = route_self_loop(src, ys, ye, config);
            let (label_x, label_y) = label_anchor(&path);
            let gate_s = path[1];
            let gate_d = path[path.len() - 2];
            routed.push(edge_layout(edge, path, (label_x, label_y), (source_side, target_side), (gate_s, gate_d)));
            continue;
        }

        let anchor_s = (side_x(src, source_side), ys);
        let anchor_d = (side_x(dst, target_side), ye);
        let lead_s = lead_x(result, &descendants, src, &dst.id, source_side, config);
        let lead_d = lead_x(result, &descendants, dst, &src.id, target_side, config);

        let others: Vec<Rect> = obstacles
            .iter()
            .filter(|(id, _)| *id != src.id && *id != dst.id)
            .map(|(_, rect)| *rect)
            .collect();
        let ends = [src.rect(), dst.rect()];

        let mut candidates: Vec<(Vec<Point>, Option<f32>)> = Vec::new();
        if let Some(bx) = bridge_x(edge, (source_side, target_side), lead_s, lead_d, config) {
            candidates.push((vec![anchor_s, (lead_s, ys), (bx, ys), (bx, ye), (lead_d, ye), anchor_d], None));
        }
        for row in corridor_rows(src, dst, ys, ye, config) {
            candidates.push((
                vec![anchor_s, (lead_s, ys), (lead_s, row), (lead_d, row), (lead_d, ye), anchor_d],
                Some(row),
            ));
        }

        let mut best: Option<RouteCandidate> = None;
        for (points, corridor) in candidates {
            let points = simplify_path(&points);
            let score = score_route(&points, &others, &ends, corridor, ys, ye, config);
            if best.as_ref().is_none_or(|current| score < current.score) {
                best = Some(RouteCandidate {
                    points,
                    score,
                    corridor,
                });
            }
        }
        let Some(best) = best else {
            continue;
        };
        log::trace!(
            "edge {}: {} route scored {:.1}",
            edge.id,
            if best.corridor.is_some() { "corridor" } else { "bridge" },
            best.score
        );
        let label = label_anchor(&best.points);
        routed.push(edge_layout(
            edge,
            best.points,
            label,
            (source_side, target_side),
            ((lead_s, ys), (lead_d, ye)),
        ));
    }
    (routed, dropped)
}

fn edge_layout(
    edge: &ViewEdge,
    path: Vec<Point>,
    label: Point,
    sides: (Side, Side),
    gates: (Point, Point),
) -> EdgeLayout {
    EdgeLayout {
        id: edge.id.clone(),
        source: edge.src_id.clone(),
        target: edge.dst_id.clone(),
        kind: edge.kind,
        label: edge.label.clone(),
        count: edge.count,
        path,
        label_x: label.0,
        label_y: label.1,
        source_side: sides.0,
        target_side: sides.1,
        source_gate: gates.0,
        target_gate: gates.1,
    }
}

/// Left-to-right travel leaves through the right side and enters through
/// the left one; the reverse otherwise. Boxes stacked in one column use the
/// same side at both ends so the route wraps around them. Self-loops go out
/// right, in left.
fn travel_sides(src: &NodeLayout, dst: &NodeLayout) -> (Side, Side) {
    if src.id == dst.id {
        return (Side::Right, Side::Left);
    }
    let (from, to) = (src.rect(), dst.rect());
    let forward = to.center_x() >= from.center_x();
    let stacked = from.x < to.right() && to.x < from.right();
    match (stacked, forward) {
        (true, true) => (Side::Right, Side::Right),
        (true, false) => (Side::Left, Side::Left),
        (false, true) => (Side::Right, Side::Left),
        (false, false) => (Side::Left, Side::Right),
    }
}

fn side_x(node: &NodeLayout, side: Side) -> f32 {
    match side {
        Side::Left => node.x,
        Side::Right => node.x + node.width,
    }
}

/// Slot count on a side: edges attached there, or the port rows drawn on it
/// when there are more of those.
fn side_ports(node: &NodeLayout, side: Side) -> usize {
    match side {
        Side::Right => node.out_ports,
        Side::Left => node.in_ports,
    }
}

fn assign_gates(
    routable: &[(&ViewEdge, &NodeLayout, &NodeLayout)],
    sides: &[(Side, Side)],
    config: &RoutingConfig,
) -> HashMap<(usize, End), f32> {
    let mut requests: BTreeMap<(String, Side), Vec<SlotRequest>> = BTreeMap::new();
    for (idx, (_, src, dst)) in routable.iter().enumerate() {
        let (source_side, target_side) = sides[idx];
        requests
            .entry((src.id.clone(), source_side))
            .or_default()
            .push(SlotRequest {
                edge_idx: idx,
                end: End::Source,
                far_y: dst.rect().center_y(),
            });
        requests
            .entry((dst.id.clone(), target_side))
            .or_default()
            .push(SlotRequest {
                edge_idx: idx,
                end: End::Target,
                far_y: src.rect().center_y(),
            });
    }

    let mut gates = HashMap::new();
    for ((_, side), mut list) in requests {
        let Some(first) = list.first() else {
            continue;
        };
        let (_, src, dst) = routable[first.edge_idx];
        let node = match first.end {
            End::Source => src,
            End::Target => dst,
        };
        list.sort_by(|a, b| {
            a.far_y
                .total_cmp(&b.far_y)
                .then_with(|| routable[a.edge_idx].0.id.cmp(&routable[b.edge_idx].0.id))
                .then_with(|| (a.end == End::Target).cmp(&(b.end == End::Target)))
        });
        let slots = list.len().max(side_ports(node, side));
        for (slot, request) in list.iter().enumerate() {
            gates.insert((request.edge_idx, request.end), gate_y(node, slot, slots, config));
        }
    }
    gates
}

/// Evenly spaced attachment height for `slot` of `slots` along the part of
/// the side below the title/summary block.
pub(crate) fn gate_y(node: &NodeLayout, slot: usize, slots: usize, config: &RoutingConfig) -> f32 {
    let port_offset = node.port_start_y - node.y;
    let top = node.y + (port_offset - 10.0).min(node.height / 2.0);
    let bottom = (node.y + node.height - config.gate_inset).max(top + 1.0);
    top + (bottom - top) * (slot + 1) as f32 / (slots.max(1) + 1) as f32
}

/// X of the first turn after leaving `node`. Pushed past every owning
/// container that does not also hold the far endpoint.
fn lead_x(
    result: &LayoutResult,
    descendants: &HashMap<&str, HashSet<String>>,
    node: &NodeLayout,
    other_id: &str,
    side: Side,
    config: &RoutingConfig,
) -> f32 {
    let mut lead = match side {
        Side::Right => node.x + node.width + config.stub_length,
        Side::Left => node.x - config.stub_length,
    };
    for owner in result.owner_chain(&node.id) {
        let holds_other = descendants
            .get(owner.id.as_str())
            .is_some_and(|members| members.contains(other_id));
        if holds_other {
            continue;
        }
        lead = match side {
            Side::Right => lead.max(owner.x + owner.width + config.boundary_clearance),
            Side::Left => lead.min(owner.x - config.boundary_clearance),
        };
    }
    lead
}

/// 32-bit FNV-1a.
fn fnv1a(parts: &[&str]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for part in parts {
        for byte in part.bytes().chain(std::iter::once(0u8)) {
            hash ^= u32::from(byte);
            hash = hash.wrapping_mul(0x0100_0193);
        }
    }
    hash
}

/// X of the bridge's vertical run. Facing sides put it between the two
/// leads; same-side routes put it outside both. `None` when the leads have
/// crossed, since no single vertical can visit both of them.
fn bridge_x(edge: &ViewEdge, sides: (Side, Side), lead_s: f32, lead_d: f32, config: &RoutingConfig) -> Option<f32> {
    let hash = fnv1a(&[&edge.src_id, &edge.dst_id, edge.kind.as_str()]);
    let unit = (hash % 1001) as f32 / 500.0 - 1.0;
    let bias = match edge.kind {
        EdgeKind::Interface => -config.kind_bias,
        EdgeKind::FileDependency => config.kind_bias,
        _ => 0.0,
    };
    let (low, high) = (lead_s.min(lead_d), lead_s.max(lead_d));
    let spread = (unit + 1.0) / 2.0 * config.hash_jitter + (bias + config.kind_bias) / 2.0;
    match sides {
        (Side::Right, Side::Right) => Some(high + spread),
        (Side::Left, Side::Left) => Some(low - spread),
        (Side::Right, Side::Left) if lead_s > lead_d => None,
        (Side::Left, Side::Right) if lead_s < lead_d => None,
        _ => {
            let mid = (lead_s + lead_d) / 2.0 + unit * config.hash_jitter + bias;
            Some(mid.clamp(low, high))
        }
    }
}

fn corridor_rows(src: &NodeLayout, dst: &NodeLayout, ys: f32, ye: f32, config: &RoutingConfig) -> Vec<f32> {
    let mid = (ys + ye) / 2.0;
    let steps = config.corridor_steps as i64;
    let mut rows: Vec<f32> = (-steps..=steps)
        .map(|k| mid + k as f32 * config.corridor_step)
        .collect();
    rows.push(src.y.min(dst.y) - config.outer_row_offset);
    rows.push((src.y + src.height).max(dst.y + dst.height) + config.outer_row_offset);
    rows
}

/// Other nodes count against every segment; the edge's own boxes only
/// against the runs between the two end stubs.
fn score_route(
    points: &[Point],
    obstacles: &[Rect],
    ends: &[Rect],
    corridor: Option<f32>,
    ys: f32,
    ye: f32,
    config: &RoutingConfig,
) -> f32 {
    let inner = points.len().saturating_sub(3);
    let own_hits = if inner == 0 {
        0
    } else {
        path_obstacle_hits(&points[1..points.len() - 1], ends)
    };
    let hits = (path_obstacle_hits(points, obstacles) + own_hits) as f32;
    let deviation = corridor.map_or(0.0, |row| (row - ys).abs() + (row - ye).abs());
    hits * config.intersection_penalty
        + path_length(points)
        + path_bend_count(points) as f32 * config.bend_penalty
        + deviation * config.deviation_weight
}

/// Overlap test for an axis-aligned segment against a box; touching the
/// border counts as a hit.
fn segment_hits_rect(a: Point, b: Point, rect: &Rect) -> bool {
    let (min_x, max_x) = (a.0.min(b.0), a.0.max(b.0));
    let (min_y, max_y) = (a.1.min(b.1), a.1.max(b.1));
    !(max_x < rect.x || min_x > rect.right() || max_y < rect.y || min_y > rect.bottom())
}

pub(crate) fn path_obstacle_hits(points: &[Point], obstacles: &[Rect]) -> usize {
    points
        .windows(2)
        .map(|segment| {
            obstacles
                .iter()
                .filter(|rect| segment_hits_rect(segment[0], segment[1], rect))
                .count()
        })
        .sum()
}

fn path_length(points: &[Point]) -> f32 {
    points
        .windows(2)
        .map(|segment| (segment[1].0 - segment[0].0).abs() + (segment[1].1 - segment[0].1).abs())
        .sum()
}

pub(crate) fn path_bend_count(points: &[Point]) -> usize {
    points
        .windows(3)
        .filter(|window| {
            let horizontal_in = (window[1].1 - window[0].1).abs() <= EPS;
            let horizontal_out = (window[2].1 - window[1].1).abs() <= EPS;
            horizontal_in != horizontal_out
        })
        .count()
}

/// Drops repeated points and interior points that continue a straight run
/// in the same direction.
/// The first and last points are always kept.
fn simplify_path(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &point in points {
        if let Some(&last) = out.last()
            && (point.0 - last.0).abs() <= EPS
            && (point.1 - last.1).abs() <= EPS
        {
            continue;
        }
        if out.len() >= 2 {
            let prev = out[out.len() - 2];
            let last = out[out.len() - 1];
            // Only straight continuations merge; a reversal keeps its turn point.
            let vertical_run = (prev.0 - last.0).abs() <= EPS
                && (last.0 - point.0).abs() <= EPS
                && (last.1 - prev.1) * (point.1 - last.1) > 0.0;
            let horizontal_run = (prev.1 - last.1).abs() <= EPS
                && (last.1 - point.1).abs() <= EPS
                && (last.0 - prev.0) * (point.0 - last.0) > 0.0;
            if vertical_run || horizontal_run {
                out.pop();
            }
        }
        out.push(point);
    }
    if out.len() == 1 && points.len() > 1 {
        out.push(points[points.len() - 1]);
    }
    out
}

/// Point halfway along the path.
fn label_anchor(points: &[Point]) -> Point {
    let Some(&first) = points.first() else {
        return (0.0, 0.0);
    };
    let half = path_length(points) / 2.0;
    let mut walked = 0.0f32;
    for segment in points.windows(2) {
        let length = (segment[1].0 - segment[0].0).abs() + (segment[1].1 - segment[0].1).abs();
        if walked + length >= half && length > 0.0 {
            let t = (half - walked) / length;
            return (
                segment[0].0 + (segment[1].0 - segment[0].0) * t,
                segment[0].1 + (segment[1].1 - segment[0].1) * t,
            );
        }
        walked += length;
    }
    first
}

/// Out through the right side, over the top, back in through the left side.
fn route_self_loop(node: &NodeLayout, ys: f32, ye: f32, config: &RoutingConfig) -> Vec<Point> {
    let right = node.x + node.width;
    let out_x = right + config.stub_length;
    let in_x = node.x - config.stub_length;
    let above = node.y - config.stub_length;
    vec![
        (right, ys),
        (out_x, ys),
        (out_x, above),
        (in_x, above),
        (in_x, ye),
        (node.x, ye),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeKind;
    use crate::layout::hierarchy::ContainerDef;
    use crate::layout::types::ContainerLayout;

    fn node(id: &str, x: f32, y: f32, out_ports: usize) -> NodeLayout {
        NodeLayout {
            id: id.to_string(),
            name: id.to_string(),
            layer: "Backend".to_string(),
            kind: NodeKind::Module,
            x,
            y,
            width: 180.0,
            height: 110.0,
            min_width: 180.0,
            min_height: 110.0,
            port_start_y: y + 62.0,
            in_ports: 0,
            out_ports,
            summary_lines: Vec::new(),
            owner: None,
        }
    }

    fn result_with(nodes: Vec<NodeLayout>) -> LayoutResult {
        let mut result = LayoutResult::default();
        for item in nodes {
            result.nodes.insert(item.id.clone(), item);
        }
        result
    }

    fn dep(id: &str, src: &str, dst: &str) -> ViewEdge {
        ViewEdge::new(id, src, dst, EdgeKind::Dependency)
    }

    #[test]
    fn gates_on_a_shared_side_are_ordered_by_slot() {
        let config = RoutingConfig::default();
        let result = result_with(vec![
            node("hub", 40.0, 200.0, 0),
            node("top", 400.0, 40.0, 0),
            node("mid", 400.0, 200.0, 0),
            node("low", 400.0, 360.0, 0),
        ]);
        let edges = vec![dep("e3", "hub", "low"), dep("e1", "hub", "top"), dep("e2", "hub", "mid")];
        let (routed, dropped) = route_edges(&result, &edges, &ContainerTree::default(), &config);
        assert!(dropped.is_empty());
        let start_y = |id: &str| routed.iter().find(|edge| edge.id == id).map(|edge| edge.path[0].1);
        let (Some(top), Some(mid), Some(low)) = (start_y("e1"), start_y("e2"), start_y("e3")) else {
            panic!("missing edge");
        };
        assert!(top < mid && mid < low);
        for edge in &routed {
            assert_eq!(edge.path[0].0, 220.0);
            assert_eq!(edge.source_side, Side::Right);
            assert_eq!(edge.path.last().map(|point| point.0), Some(400.0));
        }
    }

    #[test]
    fn port_rows_widen_the_slot_count() {
        let config = RoutingConfig::default();
        let busy = node("busy", 0.0, 0.0, 3);
        let first_of_one = gate_y(&busy, 0, 1, &config);
        let first_of_three = gate_y(&busy, 0, 3, &config);
        assert!(first_of_three < first_of_one);
        assert!(first_of_three >= busy.y + 52.0);
        assert!(gate_y(&busy, 2, 3, &config) <= busy.y + busy.height - config.gate_inset);
    }

    #[test]
    fn bridge_route_avoids_a_box_in_the_way() {
        let config = RoutingConfig::default();
        let result = result_with(vec![
            node("a", 0.0, 100.0, 0),
            node("wall", 260.0, 60.0, 0),
            node("b", 520.0, 100.0, 0),
        ]);
        let edges = vec![dep("e", "a", "b")];
        let (routed, _) = route_edges(&result, &edges, &ContainerTree::default(), &config);
        let wall = result.nodes["wall"].rect().inflate(config.obstacle_margin);
        assert_eq!(path_obstacle_hits(&routed[0].path, &[wall]), 0);
        assert_eq!(routed[0].path[0].0, 180.0);
        assert_eq!(routed[0].path.last().map(|point| point.0), Some(520.0));
    }

    #[test]
    fn right_to_left_edges_swap_sides() {
        let config = RoutingConfig::default();
        let result = result_with(vec![node("a", 400.0, 0.0, 0), node("b", 0.0, 0.0, 0)]);
        let (routed, _) = route_edges(&result, &[dep("e", "a", "b")], &ContainerTree::default(), &config);
        assert_eq!(routed[0].source_side, Side::Left);
        assert_eq!(routed[0].target_side, Side::Right);
        assert_eq!(routed[0].path[0].0, 400.0);
        assert_eq!(routed[0].path.last().map(|point| point.0), Some(180.0));
    }

    #[test]
    fn unknown_endpoints_and_self_loops() {
        let config = RoutingConfig::default();
        let result = result_with(vec![node("a", 0.0, 0.0, 0)]);
        let edges = vec![dep("ghost", "a", "missing"), dep("loop", "a", "a")];
        let (routed, dropped) = route_edges(&result, &edges, &ContainerTree::default(), &config);
        assert_eq!(dropped, vec!["ghost"]);
        assert_eq!(routed.len(), 1);
        let path = &routed[0].path;
        assert_eq!(path[0].0, 180.0);
        assert_eq!(path.last().map(|point| point.0), Some(0.0));
        assert!(path.iter().any(|point| point.1 < 0.0));
    }

    #[test]
    fn parallel_kinds_take_different_bridges() {
        let config = RoutingConfig::default();
        let facing = (Side::Right, Side::Left);
        let interface = ViewEdge::new("i", "a", "b", EdgeKind::Interface);
        let file = ViewEdge::new("f", "a", "b", EdgeKind::FileDependency);
        assert_ne!(
            bridge_x(&interface, facing, 200.0, 400.0, &config),
            bridge_x(&file, facing, 200.0, 400.0, &config)
        );
        let Some(x) = bridge_x(&interface, facing, 200.0, 400.0, &config) else {
            panic!("facing leads must bridge");
        };
        assert!((200.0..=400.0).contains(&x));
        assert_eq!(bridge_x(&interface, facing, 400.0, 200.0, &config), None);
        let wrap = bridge_x(&file, (Side::Right, Side::Right), 200.0, 260.0, &config);
        assert!(wrap.is_some_and(|x| x >= 260.0));
    }

    fn passes_through(path: &[Point], point: Point) -> bool {
        path.windows(2).any(|segment| {
            let (a, b) = (segment[0], segment[1]);
            point.0 >= a.0.min(b.0) - EPS
                && point.0 <= a.0.max(b.0) + EPS
                && point.1 >= a.1.min(b.1) - EPS
                && point.1 <= a.1.max(b.1) + EPS
        })
    }

    #[test]
    fn stacked_boxes_are_wrapped_on_one_side() {
        let config = RoutingConfig::default();
        let result = result_with(vec![node("a", 0.0, 0.0, 0), node("b", 0.0, 200.0, 0)]);
        let (routed, _) = route_edges(&result, &[dep("e", "a", "b")], &ContainerTree::default(), &config);
        let edge = &routed[0];
        assert_eq!((edge.source_side, edge.target_side), (Side::Right, Side::Right));
        assert_eq!(edge.path.len(), 4, "path: {:?}", edge.path);
        assert_eq!(path_bend_count(&edge.path), 2);
        assert!(edge.path[1].0 > 180.0 && edge.path[2].0 > 180.0);
        let boxes = [result.nodes["a"].rect(), result.nodes["b"].rect()];
        assert_eq!(path_obstacle_hits(&edge.path[1..3], &boxes), 0);
    }

    #[test]
    fn crossed_leads_still_leave_through_the_container_gate() {
        let config = RoutingConfig::default();
        let mut inside = node("a", 20.0, 100.0, 0);
        inside.owner = Some("box".to_string());
        let mut result = result_with(vec![inside, node("b", 400.0, 400.0, 0)]);
        result.containers.insert(
            "box".to_string(),
            ContainerLayout {
                id: "box".to_string(),
                name: "box".to_string(),
                layer: "Backend".to_string(),
                parent_id: None,
                level: 0,
                x: 0.0,
                y: 0.0,
                width: 600.0,
                height: 300.0,
                min_width: 600.0,
                min_height: 300.0,
                members: vec!["a".to_string()],
                member_count: 1,
            },
        );
        let mut tree = ContainerTree::default();
        tree.containers.insert(
            "box".to_string(),
            ContainerDef {
                id: "box".to_string(),
                name: "box".to_string(),
                layer: "Backend".to_string(),
                kind: NodeKind::Module,
                parent_id: None,
                nodes: vec!["a".to_string()],
                children: Vec::new(),
                level: 0,
            },
        );
        tree.node_owner.insert("a".to_string(), "box".to_string());

        let (routed, _) = route_edges(&result, &[dep("e", "a", "b")], &tree, &config);
        let edge = &routed[0];
        assert_eq!(edge.source_gate.0, 600.0 + config.boundary_clearance);
        assert!(passes_through(&edge.path, edge.source_gate), "path: {:?}", edge.path);
        assert!(passes_through(&edge.path, edge.target_gate), "path: {:?}", edge.path);
    }

    #[test]
    fn simplify_keeps_reversals() {
        let path = vec![(0.0, 0.0), (50.0, 0.0), (30.0, 0.0), (30.0, 40.0)];
        assert_eq!(simplify_path(&path), path);
    }

    #[test]
    fn simplify_keeps_endpoints_and_turns() {
        let path = vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (20.0, 0.0), (20.0, 30.0), (40.0, 30.0)];
        let simple = simplify_path(&path);
        assert_eq!(simple, vec![(0.0, 0.0), (20.0, 0.0), (20.0, 30.0), (40.0, 30.0)]);
        assert_eq!(path_bend_count(&simple), 2);
        assert_eq!(label_anchor(&simple), (20.0, 15.0));
    }
}
