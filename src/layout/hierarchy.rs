use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::ir::{ExpansionState, Lineage, NodeKind, ViewNode};

/// One composite box whose children are currently visible.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ContainerDef {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) layer: String,
    pub(crate) kind: NodeKind,
    /// Nearest ancestor that is also a container.
    pub(crate) parent_id: Option<String>,
    /// Visible nodes owned directly by this container.
    pub(crate) nodes: Vec<String>,
    /// Containers nested directly inside this one.
    pub(crate) children: Vec<String>,
    /// Nesting level in the container tree; roots are 0.
    pub(crate) level: usize,
}

impl ContainerDef {
    pub(crate) fn members(&self) -> Vec<String> {
        self.nodes.iter().chain(self.children.iter()).cloned().collect()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ContainerTree {
    pub(crate) containers: BTreeMap<String, ContainerDef>,
    /// Visible node id -> its single direct owner.
    pub(crate) node_owner: BTreeMap<String, String>,
}

impl ContainerTree {
    pub(crate) fn roots(&self) -> Vec<&ContainerDef> {
        self.containers
            .values()
            .filter(|def| def.parent_id.is_none())
            .collect()
    }

    /// Containers ordered deepest level first, ties by id.
    pub(crate) fn deepest_first(&self) -> Vec<&ContainerDef> {
        let mut defs: Vec<&ContainerDef> = self.containers.values().collect();
        defs.sort_by(|a, b| b.level.cmp(&a.level).then_with(|| a.id.cmp(&b.id)));
        defs
    }

    /// Every node and container id nested (at any depth) inside `id`.
    pub(crate) fn descendants(&self, id: &str) -> HashSet<String> {
        let mut out = HashSet::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            let Some(def) = self.containers.get(&current) else {
                continue;
            };
            out.extend(def.nodes.iter().cloned());
            for child in &def.children {
                if out.insert(child.clone()) {
                    stack.push(child.clone());
                }
            }
        }
        out
    }
}

/// Derives the container tree from the ancestor chains of the focused,
/// expanded and selected modules.
pub(crate) fn build_container_tree(
    visible: &[ViewNode],
    lineage: &Lineage,
    expansion: &ExpansionState,
) -> ContainerTree {
    let visible_ids: HashSet<&str> = visible.iter().map(|node| node.id.as_str()).collect();

    let mut seeds: Vec<&str> = expansion.focus_path_ids.iter().map(String::as_str).collect();
    seeds.extend(expansion.expanded_module_ids.iter().map(String::as_str));
    if let Some(selected) = expansion.selected_module_id.as_deref() {
        seeds.push(selected);
    }

    let mut candidates: BTreeSet<String> = BTreeSet::new();
    for seed in seeds {
        for id in lineage.lineage(seed) {
            let kind = lineage.record(&id).map(|record| record.kind);
            if kind == Some(NodeKind::Layer) {
                // Lanes frame these already.
                continue;
            }
            if visible_ids.contains(id.as_str()) {
                if seed != id {
                    log::debug!("container candidate {id} is also a visible node; keeping it as a node");
                }
                continue;
            }
            candidates.insert(id);
        }
    }
    if candidates.is_empty() {
        return ContainerTree::default();
    }

    let depth: HashMap<&str, usize> = candidates
        .iter()
        .map(|id| (id.as_str(), lineage.ancestors(id).len()))
        .collect();

    // Membership: every visible node whose ancestor chain passes through the
    // candidate, falling back to direct children by parent id.
    let mut membership: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for node in visible {
        for ancestor in lineage.ancestors(&node.id) {
            if let Some(candidate) = candidates.get(&ancestor) {
                membership.entry(candidate.as_str()).or_default().push(node.id.as_str());
            }
        }
    }
    for candidate in &candidates {
        if membership.get(candidate.as_str()).is_some_and(|members| !members.is_empty()) {
            continue;
        }
        let direct: Vec<&str> = visible
            .iter()
            .filter(|node| node.parent_id.as_deref() == Some(candidate.as_str()))
            .map(|node| node.id.as_str())
            .collect();
        if !direct.is_empty() {
            membership.insert(candidate.as_str(), direct);
        }
    }

    let mut order: Vec<&str> = candidates.iter().map(String::as_str).collect();
    order.sort_by(|a, b| depth[b].cmp(&depth[a]).then_with(|| a.cmp(b)));

    let mut claimed: HashSet<&str> = HashSet::new();
    let mut child_lists: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut containers: BTreeMap<String, ContainerDef> = BTreeMap::new();
    let mut node_owner: BTreeMap<String, String> = BTreeMap::new();

    for id in order {
        let mut nodes: Vec<String> = Vec::new();
        for member in membership.get(id).into_iter().flatten() {
            if claimed.insert(member) {
                nodes.push(member.to_string());
            }
        }
        let children = child_lists.remove(id).unwrap_or_default();
        let record = lineage.record(id);
        let kind = record.map(|record| record.kind).unwrap_or_default();
        if nodes.is_empty() && children.is_empty() && kind != NodeKind::System {
            log::debug!("dropping container {id}: no visible members");
            continue;
        }

        let parent_id = lineage
            .ancestors(id)
            .into_iter()
            .rev()
            .find(|ancestor| candidates.contains(ancestor));
        if let Some(parent) = &parent_id {
            child_lists.entry(parent.clone()).or_default().push(id.to_string());
        }
        for node in &nodes {
            node_owner.insert(node.clone(), id.to_string());
        }

        let layer = record
            .map(|record| record.layer.clone())
            .filter(|layer| !layer.is_empty())
            .or_else(|| {
                nodes
                    .first()
                    .and_then(|first| visible.iter().find(|node| &node.id == first))
                    .map(|node| node.layer.clone())
            })
            .unwrap_or_default();

        let mut children = children;
        children.sort();
        containers.insert(
            id.to_string(),
            ContainerDef {
                id: id.to_string(),
                name: record.map(|record| record.name.clone()).unwrap_or_else(|| id.to_string()),
                layer,
                kind,
                parent_id,
                nodes,
                children,
                level: 0,
            },
        );
    }

    assign_levels(&mut containers);
    ContainerTree {
        containers,
        node_owner,
    }
}

fn assign_levels(containers: &mut BTreeMap<String, ContainerDef>) {
    let parents: BTreeMap<String, Option<String>> = containers
        .iter()
        .map(|(id, def)| (id.clone(), def.parent_id.clone()))
        .collect();
    for (id, def) in containers.iter_mut() {
        let mut level = 0usize;
        let mut current = parents.get(id).cloned().flatten();
        while let Some(parent) = current {
            level += 1;
            if level > parents.len() {
                break;
            }
            current = parents.get(&parent).cloned().flatten();
        }
        def.level = level;
    }
}
