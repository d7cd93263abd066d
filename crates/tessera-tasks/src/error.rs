//! Errors raised while resolving and visiting package tasks

use thiserror::Error;

/// Failure to turn a task id into a resolved package task
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The id is not of the form `workspace#task`
    #[error("Malformed task id '{0}': expected \"workspace#task\"")]
    MalformedTaskId(String),

    /// The id names a workspace missing from the metadata mapping
    #[error("Cannot find workspace '{workspace}' for task {task_id}")]
    UnknownWorkspace { workspace: String, task_id: String },

    /// Neither `workspace#task` nor `task` is defined in the pipeline
    #[error("No task defined in pipeline for {task_id} (looked up '{task_id}' and '{task_name}')")]
    TaskDefinitionNotFound { task_id: String, task_name: String },
}

/// Error returned by the package-task visitor adapter.
///
/// Resolution failures surface as [`VisitError::Task`]; whatever the
/// injected visitor returns is kept intact inside [`VisitError::Visitor`].
#[derive(Debug, Error)]
pub enum VisitError<E> {
    /// The task could not be resolved; the visitor was not called
    #[error(transparent)]
    Task(#[from] TaskError),

    /// The injected visitor failed
    #[error("Task {task_id} failed: {source}")]
    Visitor {
        task_id: String,
        #[source]
        source: E,
    },
}

impl<E> VisitError<E> {
    /// The task id of a visitor failure
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::Visitor { task_id, .. } => Some(task_id.as_str()),
            Self::Task(_) => None,
        }
    }

    /// The resolution error, if resolution failed
    pub fn as_task_error(&self) -> Option<&TaskError> {
        match self {
            Self::Task(err) => Some(err),
            Self::Visitor { .. } => None,
        }
    }

    /// Recover the visitor's own error value
    pub fn into_visitor_error(self) -> Option<E> {
        match self {
            Self::Visitor { source, .. } => Some(source),
            Self::Task(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error, PartialEq)]
    #[error("exit code {0}")]
    struct ExitCode(i32);

    #[test]
    fn test_visitor_error_keeps_source() {
        let err: VisitError<ExitCode> = VisitError::Visitor {
            task_id: "web#build".to_string(),
            source: ExitCode(2),
        };

        assert_eq!(err.to_string(), "Task web#build failed: exit code 2");
        assert_eq!(err.source().unwrap().to_string(), "exit code 2");
        assert_eq!(err.task_id(), Some("web#build"));
        assert_eq!(err.into_visitor_error(), Some(ExitCode(2)));
    }

    #[test]
    fn test_task_error_is_transparent() {
        let err: VisitError<ExitCode> = TaskError::MalformedTaskId("build".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Malformed task id 'build': expected \"workspace#task\""
        );
        assert!(err.task_id().is_none());
        assert!(err.as_task_error().is_some());
    }
}
