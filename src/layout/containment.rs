use std::collections::{BTreeMap, BTreeSet};

use crate::config::ContainmentConfig;
use crate::ir::ManualOverride;

use super::hierarchy::ContainerTree;
use super::types::{ContainerLayout, LaneLayout, LayoutResult, Point, Rect};

/// Applies user-dragged positions and resizes. Containers go first, shallowest
/// level first, and carry their whole subtree along; node overrides land last
/// so they are not displaced by an ancestor move. Returns the ids that were
/// pinned by an override.
pub(crate) fn apply_overrides(
    result: &mut LayoutResult,
    tree: &ContainerTree,
    overrides: &BTreeMap<String, ManualOverride>,
) -> BTreeSet<String> {
    let mut pinned = BTreeSet::new();
    let mut container_ids: Vec<(usize, &String)> = overrides
        .keys()
        .filter_map(|id| result.containers.get(id).map(|container| (container.level, id)))
        .collect();
    container_ids.sort();

    for (_, id) in container_ids {
        let Some(container) = result.containers.get(id) else {
            continue;
        };
        let over = &overrides[id];
        let dx = over.x - container.x;
        let dy = over.y - container.y;
        shift_descendants(result, tree, id, dx, dy);
        let Some(container) = result.containers.get_mut(id) else {
            continue;
        };
        let width = clamp_size(id, "width", over.width.unwrap_or(container.width), container.min_width);
        let height = clamp_size(
            id,
            "height",
            over.height.unwrap_or(container.height),
            container.min_height,
        );
        container.set_rect(Rect::new(over.x, over.y, width, height));
        pinned.insert(id.clone());
    }

    for (id, over) in overrides {
        if result.containers.contains_key(id) {
            continue;
        }
        let Some(node) = result.nodes.get_mut(id) else {
            log::debug!("ignoring override for unknown item {id}");
            continue;
        };
        let width = clamp_size(id, "width", over.width.unwrap_or(node.width), node.min_width);
        let height = clamp_size(id, "height", over.height.unwrap_or(node.height), node.min_height);
        node.set_rect(Rect::new(over.x, over.y, width, height));
        pinned.insert(id.clone());
    }
    pinned
}

fn clamp_size(id: &str, axis: &str, requested: f32, minimum: f32) -> f32 {
    if requested < minimum {
        log::debug!("clamping {axis} of {id} from {requested} to its minimum {minimum}");
        minimum
    } else {
        requested
    }
}

/// Pushes overlapping siblings apart and regrows containers around their
/// members, innermost containers first, then the top-level items.
pub(crate) fn settle(
    result: &mut LayoutResult,
    tree: &ContainerTree,
    pinned: &BTreeSet<String>,
    config: &ContainmentConfig,
) {
    for def in tree.deepest_first() {
        separate_siblings(result, tree, &def.members(), pinned, config.sibling_gap);
        let mut bounds = match result.containers.get(&def.id) {
            Some(container) => container.rect(),
            None => continue,
        };
        for node_id in &def.nodes {
            if let Some(node) = result.nodes.get(node_id) {
                bounds = bounds.union(&node.rect().outset(&config.node_margin));
            }
        }
        for child_id in &def.children {
            if let Some(child) = result.containers.get(child_id) {
                bounds = bounds.union(&child.rect().outset(&config.container_margin));
            }
        }
        if let Some(container) = result.containers.get_mut(&def.id) {
            bounds.width = bounds.width.max(container.min_width);
            bounds.height = bounds.height.max(container.min_height);
            container.set_rect(bounds);
        }
    }

    let mut roots: Vec<String> = tree.roots().into_iter().map(|def| def.id.clone()).collect();
    roots.extend(
        result
            .nodes
            .values()
            .filter(|node| node.owner.is_none())
            .map(|node| node.id.clone()),
    );
    separate_siblings(result, tree, &roots, pinned, config.sibling_gap);
}

/// Greedy sibling separation. Pinned items claim their spot first; every
/// other item slides right or down, whichever is shorter, until it is clear.
fn separate_siblings(
    result: &mut LayoutResult,
    tree: &ContainerTree,
    ids: &[String],
    pinned: &BTreeSet<String>,
    gap: f32,
) {
    let mut order: Vec<(bool, Rect, &String)> = ids
        .iter()
        .filter_map(|id| result.item_rect(id).map(|rect| (!pinned.contains(id), rect, id)))
        .collect();
    if order.len() < 2 {
        return;
    }
    order.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.y.total_cmp(&b.1.y))
            .then_with(|| a.1.x.total_cmp(&b.1.x))
            .then_with(|| a.2.cmp(b.2))
    });

    let mut placed: Vec<Rect> = Vec::with_capacity(order.len());
    for (_, start, id) in order {
        let mut rect = start;
        let limit = placed.len() * 2 + 2;
        let mut attempts = 0usize;
        while let Some(blocker) = placed.iter().find(|other| rect.overlaps(other)) {
            if attempts >= limit {
                let right = placed.iter().map(Rect::right).fold(f32::MIN, f32::max);
                rect.x = right + gap;
                break;
            }
            let dx = blocker.right() + gap - rect.x;
            let dy = blocker.bottom() + gap - rect.y;
            if dx <= dy {
                rect.x += dx;
            } else {
                rect.y += dy;
            }
            attempts += 1;
        }
        if rect != start {
            log::trace!("moving {id} by ({}, {}) to clear its siblings", rect.x - start.x, rect.y - start.y);
            shift_item(result, tree, id, rect.x - start.x, rect.y - start.y);
        }
        placed.push(rect);
    }
}

fn shift_item(result: &mut LayoutResult, tree: &ContainerTree, id: &str, dx: f32, dy: f32) {
    if let Some(node) = result.nodes.get_mut(id) {
        let rect = node.rect();
        node.set_rect(Rect::new(rect.x + dx, rect.y + dy, rect.width, rect.height));
        return;
    }
    if let Some(container) = result.containers.get_mut(id) {
        container.x += dx;
        container.y += dy;
        shift_descendants(result, tree, id, dx, dy);
    }
}

fn shift_descendants(result: &mut LayoutResult, tree: &ContainerTree, id: &str, dx: f32, dy: f32) {
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    for member in tree.descendants(id) {
        if let Some(node) = result.nodes.get_mut(&member) {
            let rect = node.rect();
            node.set_rect(Rect::new(rect.x + dx, rect.y + dy, rect.width, rect.height));
        } else if let Some(container) = result.containers.get_mut(&member) {
            container.x += dx;
            container.y += dy;
        }
    }
}

/// Two bounded passes that grow containers until every member fits inside
/// its owners with the configured margins. Boxes only ever grow.
pub(crate) fn enforce_containment(result: &mut LayoutResult, config: &ContainmentConfig) {
    let limit = result.containers.len();

    let node_rects: Vec<(Option<String>, Rect)> = result
        .nodes
        .values()
        .map(|node| (node.owner.clone(), node.rect().outset(&config.node_margin)))
        .collect();
    for (owner, needed) in node_rects {
        let mut current = owner;
        let mut steps = 0usize;
        while let Some(owner_id) = current {
            if steps > limit {
                log::debug!("owner chain through {owner_id} does not terminate");
                break;
            }
            steps += 1;
            let Some(container) = result.containers.get_mut(&owner_id) else {
                break;
            };
            grow_to_cover(container, &needed);
            current = container.parent_id.clone();
        }
    }

    let mut order: Vec<(usize, String)> = result
        .containers
        .values()
        .map(|container| (container.level, container.id.clone()))
        .collect();
    order.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    for (_, id) in order {
        let Some(child) = result.containers.get(&id) else {
            continue;
        };
        let Some(parent_id) = child.parent_id.clone() else {
            continue;
        };
        let needed = child.rect().outset(&config.container_margin);
        if let Some(parent) = result.containers.get_mut(&parent_id) {
            grow_to_cover(parent, &needed);
        }
    }
}

fn grow_to_cover(container: &mut ContainerLayout, needed: &Rect) {
    let mut rect = container.rect().union(needed);
    rect.width = rect.width.max(container.min_width);
    rect.height = rect.height.max(container.min_height);
    container.set_rect(rect);
}

/// Rebuilds one lane per grouping tag, in lane order, around every node
/// and container carrying that tag plus a uniform margin.
pub(crate) fn fit_lanes(result: &mut LayoutResult, order: &[String], margin: f32) {
    let mut lanes = Vec::with_capacity(order.len());
    for layer in order {
        let mut members: Vec<(String, Rect)> = result
            .nodes
            .values()
            .filter(|node| &node.layer == layer)
            .map(|node| (node.id.clone(), node.rect()))
            .chain(
                result
                    .containers
                    .values()
                    .filter(|container| &container.layer == layer)
                    .map(|container| (container.id.clone(), container.rect())),
            )
            .collect();
        members.sort_by(|a, b| a.0.cmp(&b.0));
        let Some(bounds) = members
            .iter()
            .map(|(_, rect)| *rect)
            .reduce(|acc, rect| acc.union(&rect))
        else {
            log::debug!("lane {layer} has no laid-out members");
            continue;
        };
        let rect = bounds.inflate(margin);
        lanes.push(LaneLayout {
            layer: layer.clone(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            members: members.into_iter().map(|(id, _)| id).collect(),
        });
    }
    result.lanes = lanes;
}

/// Translates the whole layout so nothing sits closer than `padding` to the
/// top or left edge. A layout already clear of the padding is left alone,
/// keeping dragged positions where the user put them.
pub(crate) fn normalize(result: &mut LayoutResult, padding: f32) {
    let (min_x, min_y) = item_rects(result)
        .map(|rect| (rect.x, rect.y))
        .chain(result.edges.iter().flat_map(|edge| edge.path.iter().copied()))
        .fold((f32::MAX, f32::MAX), |(min_x, min_y), (x, y)| (min_x.min(x), min_y.min(y)));
    let shift_x = if min_x < padding { padding - min_x } else { 0.0 };
    let shift_y = if min_y < padding { padding - min_y } else { 0.0 };
    if shift_x == 0.0 && shift_y == 0.0 {
        return;
    }
    log::trace!("shifting layout by ({shift_x}, {shift_y}) to keep it inside the padding");

    for node in result.nodes.values_mut() {
        let rect = node.rect();
        node.set_rect(Rect::new(rect.x + shift_x, rect.y + shift_y, rect.width, rect.height));
    }
    for container in result.containers.values_mut() {
        container.x += shift_x;
        container.y += shift_y;
    }
    for lane in &mut result.lanes {
        lane.x += shift_x;
        lane.y += shift_y;
    }
    let shift = |point: &mut Point| {
        point.0 += shift_x;
        point.1 += shift_y;
    };
    for edge in &mut result.edges {
        edge.path.iter_mut().for_each(&shift);
        shift(&mut edge.source_gate);
        shift(&mut edge.target_gate);
        edge.label_x += shift_x;
        edge.label_y += shift_y;
    }
}

fn item_rects(result: &LayoutResult) -> impl Iterator<Item = Rect> + '_ {
    result
        .nodes
        .values()
        .map(|node| node.rect())
        .chain(result.containers.values().map(|container| container.rect()))
        .chain(result.lanes.iter().map(|lane| lane.rect()))
}

/// Canvas extent: the farthest box edge or route point plus padding. An
/// empty layout is a bare `2 * padding` square.
pub(crate) fn canvas_size(result: &LayoutResult, padding: f32) -> (f32, f32) {
    let (right, bottom) = item_rects(result)
        .map(|rect| (rect.right(), rect.bottom()))
        .chain(result.edges.iter().flat_map(|edge| edge.path.iter().copied()))
        .fold((padding, padding), |(right, bottom), (x, y)| (right.max(x), bottom.max(y)));
    (right + padding, bottom + padding)
}
