use std::collections::BTreeMap;

use crate::config::PackingConfig;

use super::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum ItemKind {
    Container,
    Node,
}

/// One opaque box handed to the packer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PackItem {
    pub(crate) id: String,
    pub(crate) width: f32,
    pub(crate) height: f32,
    /// Grouping-tag band the item belongs to.
    pub(crate) group: usize,
    pub(crate) kind: ItemKind,
    /// Higher ranks are placed first.
    pub(crate) sort_rank: i64,
    pub(crate) sort_name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Packing {
    /// Top-left offset of every item relative to the packing origin.
    pub(crate) offsets: BTreeMap<String, Point>,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) columns: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct GroupedPacking {
    pub(crate) offsets: BTreeMap<String, Point>,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

struct Candidate {
    columns: usize,
    score: f32,
    width: f32,
    height: f32,
    offsets: Vec<Point>,
}

fn sort_items(items: &mut [PackItem]) {
    items.sort_by(|a, b| {
        a.group
            .cmp(&b.group)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| b.sort_rank.cmp(&a.sort_rank))
            .then_with(|| a.sort_name.cmp(&b.sort_name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Shortest-column-first assignment for a fixed column count.
fn fill_columns(items: &[PackItem], columns: usize, config: &PackingConfig) -> Candidate {
    let mut heights = vec![0.0f32; columns];
    let mut widths = vec![0.0f32; columns];
    let mut placed: Vec<(usize, f32)> = Vec::with_capacity(items.len());
    for item in items {
        let mut column = 0usize;
        for idx in 1..columns {
            if heights[idx] < heights[column] {
                column = idx;
            }
        }
        let y = if heights[column] > 0.0 {
            heights[column] + config.gap_y
        } else {
            0.0
        };
        placed.push((column, y));
        heights[column] = y + item.height;
        widths[column] = widths[column].max(item.width);
    }

    let mut column_x = vec![0.0f32; columns];
    let mut cursor = 0.0f32;
    let mut used = 0usize;
    for idx in 0..columns {
        if widths[idx] <= 0.0 {
            continue;
        }
        if used > 0 {
            cursor += config.gap_x;
        }
        column_x[idx] = cursor;
        cursor += widths[idx];
        used += 1;
    }
    let width = cursor;
    let height = heights.iter().copied().fold(0.0, f32::max);

    let aspect = if height > 0.0 { width / height } else { 0.0 };
    let score = (aspect - config.target_aspect).abs() * config.aspect_weight
        + (width * height) / config.area_unit.max(1.0) * config.area_weight
        + columns as f32 * config.column_weight;

    Candidate {
        columns,
        score,
        width,
        height,
        offsets: placed
            .into_iter()
            .map(|(column, y)| (column_x[column], y))
            .collect(),
    }
}

/// Packs items into the column count with the lowest aspect/area/column
/// score. Ties keep the smaller column count.
pub(crate) fn pack_items(items: &[PackItem], config: &PackingConfig) -> Packing {
    if items.is_empty() {
        return Packing::default();
    }
    let mut sorted = items.to_vec();
    sort_items(&mut sorted);

    let max_columns = config.max_columns.max(1).min(sorted.len());
    let mut best: Option<Candidate> = None;
    for columns in 1..=max_columns {
        let candidate = fill_columns(&sorted, columns, config);
        log::trace!(
            "pack {} items in {} columns: {:.0}x{:.0} score {:.2}",
            sorted.len(),
            columns,
            candidate.width,
            candidate.height,
            candidate.score
        );
        if best.as_ref().is_none_or(|current| candidate.score < current.score) {
            best = Some(candidate);
        }
    }
    let Some(best) = best else {
        return Packing::default();
    };

    Packing {
        offsets: sorted
            .iter()
            .zip(best.offsets)
            .map(|(item, offset)| (item.id.clone(), offset))
            .collect(),
        width: best.width,
        height: best.height,
        columns: best.columns,
    }
}

/// Packs each group on its own, then lays the group bands side by side,
/// each centered vertically against the tallest band.
pub(crate) fn pack_grouped(items: &[PackItem], config: &PackingConfig) -> GroupedPacking {
    let mut groups: BTreeMap<usize, Vec<PackItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.group).or_default().push(item.clone());
    }
    let packed: Vec<(usize, Packing)> = groups
        .into_iter()
        .map(|(group, members)| (group, pack_items(&members, config)))
        .collect();
    let tallest = packed.iter().map(|(_, packing)| packing.height).fold(0.0, f32::max);

    let mut result = GroupedPacking::default();
    let mut cursor = 0.0f32;
    for (idx, (_, packing)) in packed.into_iter().enumerate() {
        if idx > 0 {
            cursor += config.group_gap;
        }
        let top = (tallest - packing.height) / 2.0;
        for (id, (x, y)) in packing.offsets {
            result.offsets.insert(id, (cursor + x, top + y));
        }
        cursor += packing.width;
    }
    result.width = cursor;
    result.height = tallest;
    result
}
