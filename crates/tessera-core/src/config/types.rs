//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration for Tessera
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Files whose contents affect every task (feed the global fingerprint)
    pub global_dependencies: Vec<String>,

    /// Environment variables that affect every task
    pub global_env: Vec<String>,

    /// Task pipeline, keyed by `task` or `workspace#task`
    pub pipeline: BTreeMap<String, TaskDefinition>,
}

/// A task in the pipeline configuration.
///
/// The task layer never looks inside this record: it is resolved as a whole
/// and handed to whoever runs the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDefinition {
    /// Tasks that must complete first. `^build` means "build in every
    /// workspace this one depends on", a bare name means the same workspace.
    pub depends_on: Vec<String>,

    /// Output glob patterns (for caching)
    pub outputs: Vec<String>,

    /// Input glob patterns (for cache key computation)
    pub inputs: Vec<String>,

    /// Whether results of this task may be cached
    pub cache: bool,

    /// Environment variables that affect this task
    pub env: Vec<String>,

    /// Whether this is a persistent/long-running task (e.g., dev server)
    pub persistent: bool,

    /// How much task output to show
    pub output_mode: OutputMode,
}

impl Default for TaskDefinition {
    fn default() -> Self {
        Self {
            depends_on: Vec::new(),
            outputs: Vec::new(),
            inputs: Vec::new(),
            cache: true,
            env: Vec::new(),
            persistent: false,
            output_mode: OutputMode::default(),
        }
    }
}

impl TaskDefinition {
    /// Create a task definition with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task dependency
    pub fn with_depends_on(mut self, dep: impl Into<String>) -> Self {
        self.depends_on.push(dep.into());
        self
    }

    /// Set output globs
    pub fn with_outputs(mut self, outputs: Vec<String>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Set input globs
    pub fn with_inputs(mut self, inputs: Vec<String>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Set whether the task is cacheable
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Mark the task as persistent
    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Names of same-workspace tasks this task depends on
    pub fn task_dependencies(&self) -> impl Iterator<Item = &str> {
        self.depends_on
            .iter()
            .filter(|dep| !dep.starts_with(UPSTREAM_PREFIX))
            .map(String::as_str)
    }

    /// Names of tasks this task depends on in upstream workspaces
    pub fn upstream_dependencies(&self) -> impl Iterator<Item = &str> {
        self.depends_on
            .iter()
            .filter_map(|dep| dep.strip_prefix(UPSTREAM_PREFIX))
    }
}

/// Prefix marking a `depends_on` entry as an upstream-workspace dependency
pub const UPSTREAM_PREFIX: &str = "^";

/// How task output is surfaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Show all output
    #[default]
    Full,
    /// Only show the task hash
    HashOnly,
    /// Only show output on cache misses
    NewOnly,
    /// Only show output on errors
    ErrorsOnly,
    /// Show nothing
    None,
}
