//! Workspace dependency graph

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, field, info, instrument, Span};

use crate::error::GraphError;

use super::workspace::{WorkspaceInfo, WorkspaceInfos};

/// Name of the synthetic node representing the repository root
pub const ROOT_NODE_NAME: &str = "___ROOT___";

/// Directed acyclic graph of workspaces.
///
/// An edge `a -> b` means "a depends on b". Every graph contains one
/// synthetic root node; workspaces without in-repo dependencies depend on
/// it, so root-level tasks have a place to hang. Edges that would close a
/// cycle are rejected when they are added, so a constructed graph is always
/// acyclic.
#[derive(Debug, Clone)]
pub struct WorkspaceGraph {
    root: String,
    /// Direct dependencies per node
    dependencies: BTreeMap<String, BTreeSet<String>>,
    /// Direct dependents per node
    dependents: BTreeMap<String, BTreeSet<String>>,
}

impl Default for WorkspaceGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceGraph {
    /// Create a graph holding only the root node
    pub fn new() -> Self {
        Self::with_root(ROOT_NODE_NAME)
    }

    /// Create a graph with a custom root node name
    pub fn with_root(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut graph = Self {
            root: root.clone(),
            dependencies: BTreeMap::new(),
            dependents: BTreeMap::new(),
        };
        graph.add_node(root);
        graph
    }

    /// Build a graph from discovered workspaces.
    ///
    /// Dependencies naming something outside the workspace set (registry
    /// packages) are ignored. All edges are inserted first and the graph is
    /// checked for cycles once at the end.
    #[instrument(skip_all, fields(workspaces = field::Empty))]
    pub fn build<'a, I>(workspaces: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = &'a WorkspaceInfo>,
    {
        let mut workspaces: Vec<&WorkspaceInfo> = workspaces.into_iter().collect();
        workspaces.sort_by(|a, b| a.name.cmp(&b.name));
        Span::current().record("workspaces", workspaces.len());

        let mut graph = Self::new();
        for ws in &workspaces {
            if !graph.add_node(ws.name.clone()) {
                return Err(GraphError::DuplicateWorkspace(ws.name.clone()));
            }
        }

        for ws in &workspaces {
            let mut internal = 0;
            for dep in &ws.workspace_dependencies {
                if dep == &graph.root || !graph.contains(dep) {
                    debug!(workspace = %ws.name, dependency = %dep, "skipping external dependency");
                    continue;
                }
                graph.insert_edge(&ws.name, dep);
                internal += 1;
            }
            if internal == 0 {
                let root = graph.root.clone();
                graph.insert_edge(&ws.name, &root);
            }
        }

        if let Some(cycle) = graph.find_cycle() {
            return Err(GraphError::CyclicDependency(cycle));
        }

        info!(
            workspaces = graph.workspace_count(),
            edges = graph.edge_count(),
            "workspace graph built"
        );
        Ok(graph)
    }

    /// Build a graph from a workspace metadata mapping
    pub fn from_infos(infos: &WorkspaceInfos) -> Result<Self, GraphError> {
        Self::build(infos.iter().map(|info| info.as_ref()))
    }

    /// Add a node. Returns `false` if it was already present.
    pub fn add_node(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.dependencies.contains_key(&name) {
            return false;
        }
        self.dependents.insert(name.clone(), BTreeSet::new());
        self.dependencies.insert(name, BTreeSet::new());
        true
    }

    /// Record that `from` depends on `to`.
    ///
    /// Both nodes must already exist. Fails with
    /// [`GraphError::CyclicDependency`] if `to` already reaches `from`;
    /// the graph is left unchanged in that case. Returns `false` if the edge
    /// was already present.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<bool, GraphError> {
        for node in [from, to] {
            if !self.contains(node) {
                return Err(GraphError::UnknownNode(node.to_string()));
            }
        }

        if from == to {
            return Err(GraphError::CyclicDependency(vec![
                from.to_string(),
                to.to_string(),
            ]));
        }

        if let Some(path) = self.path_between(to, from) {
            let mut cycle = Vec::with_capacity(path.len() + 1);
            cycle.push(from.to_string());
            cycle.extend(path);
            return Err(GraphError::CyclicDependency(cycle));
        }

        Ok(self.insert_edge(from, to))
    }

    /// Insert an edge between existing nodes without checking for cycles
    fn insert_edge(&mut self, from: &str, to: &str) -> bool {
        let inserted = self
            .dependencies
            .get_mut(from)
            .map(|deps| deps.insert(to.to_string()))
            .unwrap_or(false);
        if let Some(dependents) = self.dependents.get_mut(to) {
            dependents.insert(from.to_string());
        }
        inserted
    }

    /// Find a dependency path from `start` to `target`, inclusive
    fn path_between(&self, start: &str, target: &str) -> Option<Vec<String>> {
        let start = self.dependencies.get_key_value(start)?.0.as_str();
        let mut parents: BTreeMap<&str, &str> = BTreeMap::new();
        let mut seen: BTreeSet<&str> = BTreeSet::from([start]);
        let mut queue: VecDeque<&str> = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            if current == target {
                let mut path = vec![current.to_string()];
                let mut node = current;
                while let Some(parent) = parents.get(node) {
                    path.push(parent.to_string());
                    node = *parent;
                }
                path.reverse();
                return Some(path);
            }

            for dep in self.dependencies(current) {
                if seen.insert(dep) {
                    parents.insert(dep, current);
                    queue.push_back(dep);
                }
            }
        }

        None
    }

    /// Find any cycle, returned as a path whose first and last node match
    fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            InProgress,
            Done,
        }

        let mut marks: BTreeMap<&str, Mark> = BTreeMap::new();

        for (start, deps) in &self.dependencies {
            if marks.contains_key(start.as_str()) {
                continue;
            }
            marks.insert(start.as_str(), Mark::InProgress);
            let mut stack = vec![(start.as_str(), deps.iter())];

            while let Some((_, pending)) = stack.last_mut() {
                let Some(dep) = pending.next() else {
                    if let Some((done, _)) = stack.pop() {
                        marks.insert(done, Mark::Done);
                    }
                    continue;
                };
                let dep = dep.as_str();

                match marks.get(dep) {
                    Some(Mark::Done) => {}
                    Some(Mark::InProgress) => {
                        let from = stack.iter().position(|(node, _)| *node == dep).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            stack[from..].iter().map(|(node, _)| node.to_string()).collect();
                        cycle.push(dep.to_string());
                        return Some(cycle);
                    }
                    None => {
                        let Some(next) = self.dependencies.get(dep) else {
                            continue;
                        };
                        marks.insert(dep, Mark::InProgress);
                        stack.push((dep, next.iter()));
                    }
                }
            }
        }

        None
    }

    /// The synthetic root node
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Whether the graph contains a node
    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// All nodes, root included, in name order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// All workspace nodes (root excluded), in name order
    pub fn workspaces(&self) -> impl Iterator<Item = &str> {
        let root = self.root.as_str();
        self.nodes().filter(move |name| *name != root)
    }

    /// All edges as `(dependent, dependency)` pairs
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dependencies
            .iter()
            .flat_map(|(from, deps)| deps.iter().map(move |to| (from.as_str(), to.as_str())))
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Number of workspace nodes
    pub fn workspace_count(&self) -> usize {
        self.node_count() - 1
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(BTreeSet::len).sum()
    }

    /// Direct dependencies of a node
    pub fn dependencies(&self, name: &str) -> impl Iterator<Item = &str> {
        self.dependencies
            .get(name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Direct dependents of a node
    pub fn dependents(&self, name: &str) -> impl Iterator<Item = &str> {
        self.dependents
            .get(name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Nodes in topological order (dependencies before dependents).
    ///
    /// Ties are broken by name, so the order is stable across runs.
    pub fn sorted(&self) -> Vec<String> {
        let mut in_degree: BTreeMap<&str, usize> = self
            .dependencies
            .iter()
            .map(|(name, deps)| (name.as_str(), deps.len()))
            .collect();
        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut sorted = Vec::with_capacity(self.node_count());

        while let Some(name) = ready.pop_first() {
            sorted.push(name.to_string());
            for dependent in self.dependents(name) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        sorted
    }
}
