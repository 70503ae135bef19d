use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::ir::{ViewEdge, ViewNode};

/// Sort hints for one node inside its grouping tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RankHint {
    /// Approximate topological layer index.
    pub(crate) rank: usize,
    /// In- plus out-edges inside the grouping tag.
    pub(crate) degree: usize,
}

/// Computes rank and degree for `nodes`, considering only edges whose two
/// endpoints are both in the set.
///
/// rank = 1 + max(rank of in-neighbours); a node with no in-neighbours has
/// rank 0. An in-neighbour that is already on the current traversal path
/// contributes 0 instead of recursing, so cycles terminate. The result is an
/// approximation used only as a sort key.
pub(crate) fn compute_rank_hints(nodes: &[&ViewNode], edges: &[ViewEdge]) -> BTreeMap<String, RankHint> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();

    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut degree = vec![0usize; nodes.len()];
    for edge in edges {
        let (Some(&src), Some(&dst)) = (index.get(edge.src_id.as_str()), index.get(edge.dst_id.as_str()))
        else {
            continue;
        };
        degree[src] += 1;
        degree[dst] += 1;
        if src != dst {
            preds[dst].push(src);
        }
    }
    for list in &mut preds {
        list.sort_unstable();
        list.dedup();
    }

    let ranks = ranks_by_worklist(&preds);
    nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            (
                node.id.clone(),
                RankHint {
                    rank: ranks[idx],
                    degree: degree[idx],
                },
            )
        })
        .collect()
}

struct Frame {
    node: usize,
    next_pred: usize,
    best: Option<usize>,
}

/// Memoized depth-first rank computation over an explicit stack.
fn ranks_by_worklist(preds: &[Vec<usize>]) -> Vec<usize> {
    let count = preds.len();
    let mut memo: Vec<Option<usize>> = vec![None; count];
    let mut on_path = vec![false; count];
    let mut stack: Vec<Frame> = Vec::new();

    for start in 0..count {
        if memo[start].is_some() {
            continue;
        }
        on_path[start] = true;
        stack.push(Frame {
            node: start,
            next_pred: 0,
            best: None,
        });

        while let Some(frame) = stack.last_mut() {
            if let Some(&pred) = preds[frame.node].get(frame.next_pred) {
                frame.next_pred += 1;
                let contribution = if let Some(rank) = memo[pred] {
                    rank
                } else if on_path[pred] {
                    0
                } else {
                    on_path[pred] = true;
                    stack.push(Frame {
                        node: pred,
                        next_pred: 0,
                        best: None,
                    });
                    continue;
                };
                frame.best = Some(frame.best.map_or(contribution, |best| best.max(contribution)));
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            let rank = done.best.map_or(0, |best| best + 1);
            memo[done.node] = Some(rank);
            on_path[done.node] = false;
            if let Some(parent) = stack.last_mut() {
                parent.best = Some(parent.best.map_or(rank, |best| best.max(rank)));
            }
        }
    }

    memo.into_iter().map(|rank| rank.unwrap_or(0)).collect()
}

/// Deterministic ordering: layer index, containers before nodes, higher
/// degree first, then name.
pub(crate) fn compare_hints(
    a: (&RankHint, bool, &str),
    b: (&RankHint, bool, &str),
) -> Ordering {
    let (hint_a, container_a, name_a) = a;
    let (hint_b, container_b, name_b) = b;
    hint_a
        .rank
        .cmp(&hint_b.rank)
        .then_with(|| container_b.cmp(&container_a))
        .then_with(|| hint_b.degree.cmp(&hint_a.degree))
        .then_with(|| name_a.cmp(name_b))
}
