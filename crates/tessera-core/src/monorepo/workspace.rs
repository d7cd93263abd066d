//! Per-workspace metadata

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Manifest and location information for one workspace.
///
/// Produced by workspace discovery, which lives outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    /// Workspace name, unique within the repository
    pub name: String,
    /// Workspace version
    #[serde(default)]
    pub version: String,
    /// Path to the workspace directory, relative to the repository root
    pub path: PathBuf,
    /// Path to the manifest file
    pub manifest_path: PathBuf,
    /// Whether this is a private workspace
    #[serde(default)]
    pub private: bool,
    /// Dependencies on other workspaces in the repository
    #[serde(default)]
    pub workspace_dependencies: Vec<String>,
    /// Scripts declared in the manifest, by name
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl WorkspaceInfo {
    /// Create workspace metadata rooted at `path`
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            version: String::new(),
            manifest_path: path.join("package.json"),
            path,
            private: false,
            workspace_dependencies: Vec::new(),
            scripts: BTreeMap::new(),
        }
    }

    /// Set the version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a dependency on another workspace
    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        self.workspace_dependencies.push(dep.into());
        self
    }

    /// Add a manifest script
    pub fn with_script(mut self, name: impl Into<String>, command: impl Into<String>) -> Self {
        self.scripts.insert(name.into(), command.into());
        self
    }

    /// Whether the manifest declares a script for `task`
    pub fn has_script(&self, task: &str) -> bool {
        self.scripts.contains_key(task)
    }
}

/// Workspace metadata indexed by workspace name.
///
/// Entries are shared so that resolved tasks can point at their workspace
/// without copying the manifest.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceInfos {
    infos: HashMap<String, Arc<WorkspaceInfo>>,
}

impl WorkspaceInfos {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert metadata, returning the previous entry with the same name
    pub fn insert(&mut self, info: WorkspaceInfo) -> Option<Arc<WorkspaceInfo>> {
        self.infos.insert(info.name.clone(), Arc::new(info))
    }

    /// Look up a workspace by name
    pub fn get(&self, name: &str) -> Option<&Arc<WorkspaceInfo>> {
        self.infos.get(name)
    }

    /// Whether a workspace with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.infos.contains_key(name)
    }

    /// Workspace names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.infos.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over all workspaces in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<WorkspaceInfo>> {
        self.infos.values()
    }

    /// Number of workspaces
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether there are no workspaces
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

impl FromIterator<WorkspaceInfo> for WorkspaceInfos {
    fn from_iter<I: IntoIterator<Item = WorkspaceInfo>>(iter: I) -> Self {
        let mut infos = Self::new();
        for info in iter {
            infos.insert(info);
        }
        infos
    }
}
