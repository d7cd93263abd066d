//! Monorepo workspace model
//!
//! - Per-workspace metadata handed over by workspace discovery
//! - The workspace dependency graph, anchored at a synthetic root node

pub mod graph;
pub mod workspace;

pub use graph::{WorkspaceGraph, ROOT_NODE_NAME};
pub use workspace::{WorkspaceInfo, WorkspaceInfos};
