//! Task identifiers and resolved package tasks

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tessera_core::config::{TaskDefinition, TASK_DELIMITER};
use tessera_core::monorepo::WorkspaceInfo;

use crate::error::TaskError;

/// Compose a `workspace#task` id
pub fn task_id(workspace: &str, task: &str) -> String {
    format!("{}{}{}", workspace, TASK_DELIMITER, task)
}

/// Split a `workspace#task` id into its halves.
///
/// The id must contain exactly one separator and both halves must be
/// non-empty; anything else is [`TaskError::MalformedTaskId`].
pub fn split_task_id(id: &str) -> Result<(&str, &str), TaskError> {
    let mut parts = id.split(TASK_DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(workspace), Some(task), None) if !workspace.is_empty() && !task.is_empty() => {
            Ok((workspace, task))
        }
        _ => Err(TaskError::MalformedTaskId(id.to_string())),
    }
}

/// Unique identifier for a runnable task: one task in one workspace
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId {
    /// Workspace name
    pub workspace: String,
    /// Task name (e.g., "build", "test", "lint")
    pub task: String,
}

impl TaskId {
    /// Create a new task ID
    pub fn new(workspace: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            task: task.into(),
        }
    }

    /// Parse a task ID from "workspace#task" format
    pub fn parse(s: &str) -> Result<Self, TaskError> {
        let (workspace, task) = split_task_id(s)?;
        Ok(Self::new(workspace, task))
    }
}

impl FromStr for TaskId {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.workspace, TASK_DELIMITER, self.task)
    }
}

/// A task resolved against one workspace, ready to hand to an executor.
///
/// Built fresh for every visit and owned by whoever receives it.
#[derive(Debug, Clone)]
pub struct PackageTask {
    /// Task identifier
    pub id: TaskId,
    /// Metadata of the workspace the task runs in
    pub workspace: Arc<WorkspaceInfo>,
    /// The effective task definition
    pub definition: TaskDefinition,
}

impl PackageTask {
    /// The composite `workspace#task` id
    pub fn task_id(&self) -> String {
        self.id.to_string()
    }

    /// Workspace name
    pub fn workspace_name(&self) -> &str {
        &self.id.workspace
    }

    /// Task name
    pub fn task_name(&self) -> &str {
        &self.id.task
    }
}
