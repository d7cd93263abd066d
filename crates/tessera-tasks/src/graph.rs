//! The per-run aggregate of workspace graph, pipeline and metadata

use std::sync::Arc;

use tracing::{info, instrument, warn};

use tessera_core::config::TaskDefinition;
use tessera_core::monorepo::{WorkspaceGraph, WorkspaceInfo, WorkspaceInfos};

use crate::error::TaskError;
use crate::pipeline::{resolve_task_definition, Pipeline};
use crate::task::{split_task_id, PackageTask, TaskId};
use crate::visitor::{PackageTaskVisitor, TaskVisitor};

/// Everything known about the repository for one run.
///
/// Built once from discovery and configuration, then shared read-only
/// (typically behind an [`Arc`]) with every component that needs it.
/// Refreshing any part of it means building a new `CompleteGraph`.
#[derive(Debug, Clone)]
pub struct CompleteGraph {
    workspace_graph: WorkspaceGraph,
    pipeline: Pipeline,
    workspace_infos: WorkspaceInfos,
    global_hash: String,
    root_node: String,
}

impl CompleteGraph {
    /// Bind the run's inputs together.
    ///
    /// `global_hash` is an opaque fingerprint of everything that affects all
    /// tasks uniformly; it is passed through untouched.
    #[instrument(
        skip_all,
        fields(workspaces = workspace_infos.len(), pipeline_tasks = pipeline.len())
    )]
    pub fn new(
        workspace_graph: WorkspaceGraph,
        pipeline: Pipeline,
        workspace_infos: WorkspaceInfos,
        global_hash: impl Into<String>,
    ) -> Self {
        let root_node = workspace_graph.root().to_string();
        let graph = Self {
            workspace_graph,
            pipeline,
            workspace_infos,
            global_hash: global_hash.into(),
            root_node,
        };

        let unmapped = graph.unmapped_workspaces();
        if !unmapped.is_empty() {
            warn!(
                workspaces = %unmapped.join(", "),
                "workspace graph has nodes without metadata"
            );
        }
        info!(
            workspaces = graph.workspace_graph.workspace_count(),
            pipeline_tasks = graph.pipeline.len(),
            "complete graph constructed"
        );
        graph
    }

    /// The workspace dependency graph
    pub fn workspace_graph(&self) -> &WorkspaceGraph {
        &self.workspace_graph
    }

    /// The task pipeline
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Metadata for every workspace
    pub fn workspace_infos(&self) -> &WorkspaceInfos {
        &self.workspace_infos
    }

    /// Metadata for one workspace
    pub fn workspace_info(&self, name: &str) -> Option<&Arc<WorkspaceInfo>> {
        self.workspace_infos.get(name)
    }

    /// Fingerprint of the inputs shared by all tasks
    pub fn global_hash(&self) -> &str {
        &self.global_hash
    }

    /// Name of the synthetic root node
    pub fn root_node(&self) -> &str {
        &self.root_node
    }

    /// Graph nodes (root excluded) with no entry in the metadata mapping
    pub fn unmapped_workspaces(&self) -> Vec<&str> {
        self.workspace_graph
            .workspaces()
            .filter(|name| !self.workspace_infos.contains(name))
            .collect()
    }

    /// Effective task definition for a task id
    pub fn resolve_task_definition(
        &self,
        task_id: &str,
        task_name: &str,
    ) -> Result<&TaskDefinition, TaskError> {
        resolve_task_definition(&self.pipeline, task_id, task_name)
    }

    /// Resolve a `workspace#task` id into a [`PackageTask`].
    ///
    /// Fails if the id is malformed, if the workspace has no metadata, or
    /// if the pipeline has no definition for the task.
    pub fn package_task(&self, task_id: &str) -> Result<PackageTask, TaskError> {
        let (workspace_name, task_name) = split_task_id(task_id)?;

        let workspace = self
            .workspace_infos
            .get(workspace_name)
            .cloned()
            .ok_or_else(|| TaskError::UnknownWorkspace {
                workspace: workspace_name.to_string(),
                task_id: task_id.to_string(),
            })?;

        let definition = self.resolve_task_definition(task_id, task_name)?.clone();

        Ok(PackageTask {
            id: TaskId::new(workspace_name, task_name),
            workspace,
            definition,
        })
    }

    /// Wrap `visitor` so it can be driven by task id
    pub fn package_task_visitor<V: TaskVisitor>(self: &Arc<Self>, visitor: V) -> PackageTaskVisitor<V> {
        PackageTaskVisitor::new(Arc::clone(self), visitor)
    }
}
