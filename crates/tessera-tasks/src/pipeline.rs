//! Task pipeline and task definition resolution

use std::collections::HashMap;

use tessera_core::config::{Config, TaskDefinition};

use crate::error::TaskError;

/// Task definitions keyed by `task` or `workspace#task`.
///
/// A bare key applies to every workspace. A qualified key applies to one
/// workspace and replaces the bare entry outright for that workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    tasks: HashMap<String, TaskDefinition>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from a loaded configuration file
    pub fn from_config(config: &Config) -> Self {
        config
            .pipeline
            .iter()
            .map(|(key, def)| (key.clone(), def.clone()))
            .collect()
    }

    /// Add a definition, returning the one it replaced
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        definition: TaskDefinition,
    ) -> Option<TaskDefinition> {
        self.tasks.insert(key.into(), definition)
    }

    /// Builder-style [`Pipeline::insert`]
    pub fn with_task(mut self, key: impl Into<String>, definition: TaskDefinition) -> Self {
        self.insert(key, definition);
        self
    }

    /// Exact lookup by key
    pub fn get(&self, key: &str) -> Option<&TaskDefinition> {
        self.tasks.get(key)
    }

    /// Whether the exact key is defined
    pub fn contains(&self, key: &str) -> bool {
        self.tasks.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the pipeline is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Effective definition for a task. See [`resolve_task_definition`].
    pub fn resolve(&self, task_id: &str, task_name: &str) -> Result<&TaskDefinition, TaskError> {
        resolve_task_definition(self, task_id, task_name)
    }
}

impl FromIterator<(String, TaskDefinition)> for Pipeline {
    fn from_iter<I: IntoIterator<Item = (String, TaskDefinition)>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

/// Resolve the definition that applies to `task_id`.
///
/// The qualified `workspace#task` entry wins if present; otherwise the bare
/// `task_name` entry is used. The two are never merged: a qualified entry
/// that leaves a field at its default does not inherit it from the bare
/// entry.
pub fn resolve_task_definition<'p>(
    pipeline: &'p Pipeline,
    task_id: &str,
    task_name: &str,
) -> Result<&'p TaskDefinition, TaskError> {
    pipeline
        .get(task_id)
        .or_else(|| pipeline.get(task_name))
        .ok_or_else(|| TaskError::TaskDefinitionNotFound {
            task_id: task_id.to_string(),
            task_name: task_name.to_string(),
        })
}
