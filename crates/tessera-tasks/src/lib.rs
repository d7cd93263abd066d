//! Tessera Tasks - task-graph resolution core
//!
//! This crate turns task ids named by a graph walker into resolved package
//! tasks: it decodes `workspace#task` ids, resolves task definitions with
//! package-specific overrides, binds the per-run state together and adapts
//! caller-supplied visitors to the walker's callback shape.

pub mod error;
pub mod graph;
pub mod pipeline;
pub mod task;
pub mod visitor;

pub use error::{TaskError, VisitError};
pub use graph::CompleteGraph;
pub use pipeline::{resolve_task_definition, Pipeline};
pub use task::{split_task_id, task_id, PackageTask, TaskId};
pub use visitor::{PackageTaskVisitor, TaskVisitor, VisitContext};
