//! Tessera Core - shared foundations for the task-graph core
//!
//! This crate provides the error types, the pipeline configuration file,
//! workspace metadata and the acyclic workspace dependency graph that the
//! task layer is built on.

pub mod config;
pub mod error;
pub mod monorepo;

pub use config::{Config, OutputMode, TaskDefinition};
pub use error::{ConfigError, GraphError, Result, TesseraError};
pub use monorepo::{WorkspaceGraph, WorkspaceInfo, WorkspaceInfos, ROOT_NODE_NAME};
