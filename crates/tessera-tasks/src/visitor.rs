//! Adapter between a task-graph walker and package-level task logic
//!
//! A scheduler walking the task graph only knows task ids. The adapter turns
//! each id into a fully resolved [`PackageTask`] and hands it to the
//! caller's [`TaskVisitor`], which does the real work (running, dry-run
//! reporting, and so on).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::VisitError;
use crate::graph::CompleteGraph;
use crate::task::PackageTask;

/// Per-call context threaded from the scheduler to the visitor.
///
/// The adapter never inspects it; cancellation policy belongs to the
/// scheduler and the visitor.
#[derive(Debug, Clone, Default)]
pub struct VisitContext {
    cancel: CancellationToken,
}

impl VisitContext {
    /// Create a context with a fresh cancellation token
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context observing an existing token
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// The cancellation token
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether the run has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A context that is cancelled with this one but can also be cancelled
    /// on its own
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
        }
    }
}

/// Logic run for each resolved package task
pub trait TaskVisitor {
    /// Error returned by the visitor
    type Error;

    /// Handle one package task
    fn visit(&self, ctx: &VisitContext, task: PackageTask) -> Result<(), Self::Error>;
}

impl<F, E> TaskVisitor for F
where
    F: Fn(&VisitContext, PackageTask) -> Result<(), E>,
{
    type Error = E;

    fn visit(&self, ctx: &VisitContext, task: PackageTask) -> Result<(), E> {
        self(ctx, task)
    }
}

/// Visits tasks by id on behalf of a scheduler.
///
/// Holds only the shared [`CompleteGraph`] and the injected visitor; nothing
/// is written between calls, so one adapter may serve many workers at once
/// as long as the visitor itself is `Sync`.
#[derive(Debug)]
pub struct PackageTaskVisitor<V> {
    graph: Arc<CompleteGraph>,
    visitor: V,
}

impl<V: TaskVisitor> PackageTaskVisitor<V> {
    /// Wrap `visitor` around `graph`
    pub fn new(graph: Arc<CompleteGraph>, visitor: V) -> Self {
        Self { graph, visitor }
    }

    /// The graph tasks are resolved against
    pub fn graph(&self) -> &CompleteGraph {
        &self.graph
    }

    /// Resolve `task_id` and pass the result to the visitor.
    ///
    /// Resolution errors are returned without calling the visitor. A visitor
    /// error is returned as-is, tagged with the task id. The context is
    /// forwarded unchanged.
    pub fn visit(&self, ctx: &VisitContext, task_id: &str) -> Result<(), VisitError<V::Error>> {
        let package_task = self.graph.package_task(task_id)?;
        trace!(task_id, "visiting package task");

        self.visitor
            .visit(ctx, package_task)
            .map_err(|source| VisitError::Visitor {
                task_id: task_id.to_string(),
                source,
            })
    }

    /// Turn the adapter into a plain callback for a graph walker
    pub fn into_fn(self) -> impl Fn(&VisitContext, &str) -> Result<(), VisitError<V::Error>> {
        move |ctx: &VisitContext, task_id: &str| self.visit(ctx, task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tessera_core::config::TaskDefinition;
    use tessera_core::monorepo::{WorkspaceGraph, WorkspaceInfo, WorkspaceInfos};

    use crate::error::TaskError;
    use crate::pipeline::Pipeline;

    fn graph_with(workspaces: &[&str], pipeline: Pipeline) -> Arc<CompleteGraph> {
        let infos: WorkspaceInfos = workspaces
            .iter()
            .map(|name| WorkspaceInfo::new(*name, format!("packages/{}", name)))
            .collect();
        let workspace_graph = WorkspaceGraph::from_infos(&infos).unwrap();
        Arc::new(CompleteGraph::new(workspace_graph, pipeline, infos, "global"))
    }

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("build failed: {0}")]
    struct BuildFailed(String);

    #[test]
    fn test_bare_definition_used_without_override() {
        let def1 = TaskDefinition::new().with_outputs(vec!["coverage/**".to_string()]);
        let graph = graph_with(&["a", "b"], Pipeline::new().with_task("test", def1.clone()));
        let seen = Mutex::new(Vec::new());

        let adapter = graph.package_task_visitor(|_ctx: &VisitContext, task: PackageTask| {
            seen.lock().unwrap().push(task);
            Ok::<(), BuildFailed>(())
        });
        adapter.visit(&VisitContext::new(), "b#test").unwrap();
        drop(adapter);

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].workspace_name(), "b");
        assert_eq!(seen[0].task_name(), "test");
        assert_eq!(seen[0].definition, def1);
    }

    #[test]
    fn test_override_end_to_end() {
        let pipeline = Pipeline::new()
            .with_task("build", TaskDefinition::new().with_cache(true))
            .with_task("web#build", TaskDefinition::new().with_cache(false));
        let graph = graph_with(&["web", "api"], pipeline);
        let resolved = Mutex::new(HashMap::new());

        let adapter = graph.package_task_visitor(|_ctx: &VisitContext, task: PackageTask| {
            resolved
                .lock()
                .unwrap()
                .insert(task.task_id(), task.definition.cache);
            Ok::<(), BuildFailed>(())
        });
        let ctx = VisitContext::new();
        adapter.visit(&ctx, "web#build").unwrap();
        adapter.visit(&ctx, "api#build").unwrap();
        drop(adapter);

        let resolved = resolved.into_inner().unwrap();
        assert_eq!(resolved["web#build"], false);
        assert_eq!(resolved["api#build"], true);
    }

    #[test]
    fn test_unknown_workspace_skips_visitor() {
        let graph = graph_with(&["a", "b"], Pipeline::new().with_task("build", TaskDefinition::new()));
        let calls = AtomicUsize::new(0);

        let adapter = graph.package_task_visitor(|_ctx: &VisitContext, _task: PackageTask| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<(), BuildFailed>(())
        });
        let err = adapter.visit(&VisitContext::new(), "c#build").unwrap_err();

        assert_eq!(
            err.as_task_error(),
            Some(&TaskError::UnknownWorkspace {
                workspace: "c".to_string(),
                task_id: "c#build".to_string(),
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_malformed_id_and_missing_definition_skip_visitor() {
        let graph = graph_with(&["a"], Pipeline::new());
        let calls = AtomicUsize::new(0);
        let adapter = graph.package_task_visitor(|_ctx: &VisitContext, _task: PackageTask| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<(), BuildFailed>(())
        });
        let ctx = VisitContext::new();

        assert!(matches!(
            adapter.visit(&ctx, "a-build"),
            Err(VisitError::Task(TaskError::MalformedTaskId(_)))
        ));
        assert!(matches!(
            adapter.visit(&ctx, "a#build"),
            Err(VisitError::Task(TaskError::TaskDefinitionNotFound { .. }))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_visitor_error_passed_through() {
        let graph = graph_with(&["web"], Pipeline::new().with_task("build", TaskDefinition::new()));
        let adapter = graph.package_task_visitor(|_ctx: &VisitContext, task: PackageTask| {
            Err::<(), _>(BuildFailed(task.workspace.path.display().to_string()))
        });

        let err = adapter.visit(&VisitContext::new(), "web#build").unwrap_err();
        assert_eq!(err.task_id(), Some("web#build"));
        assert_eq!(
            err.into_visitor_error(),
            Some(BuildFailed("packages/web".to_string()))
        );
    }

    #[test]
    fn test_context_forwarded_unchanged() {
        let graph = graph_with(&["web"], Pipeline::new().with_task("build", TaskDefinition::new()));
        let adapter = graph.package_task_visitor(|ctx: &VisitContext, _task: PackageTask| {
            if ctx.is_cancelled() {
                Err(BuildFailed("cancelled".to_string()))
            } else {
                Ok(())
            }
        });

        let ctx = VisitContext::new();
        assert!(adapter.visit(&ctx, "web#build").is_ok());

        ctx.token().cancel();
        let err = adapter.visit(&ctx, "web#build").unwrap_err();
        assert_eq!(err.into_visitor_error(), Some(BuildFailed("cancelled".to_string())));
    }

    #[test]
    fn test_child_context_follows_parent() {
        let parent = VisitContext::new();
        let child = parent.child();
        assert!(!child.is_cancelled());
        parent.token().cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_into_fn_callback() {
        let graph = graph_with(&["web"], Pipeline::new().with_task("build", TaskDefinition::new()));
        let callback = graph
            .package_task_visitor(|_ctx: &VisitContext, _task: PackageTask| Ok::<(), BuildFailed>(()))
            .into_fn();

        let ctx = VisitContext::new();
        assert!(callback(&ctx, "web#build").is_ok());
        assert!(callback(&ctx, "api#build").is_err());
    }

    #[test]
    fn test_struct_visitor() {
        struct Recorder {
            seen: Mutex<Vec<String>>,
        }

        impl TaskVisitor for Recorder {
            type Error = BuildFailed;

            fn visit(&self, _ctx: &VisitContext, task: PackageTask) -> Result<(), BuildFailed> {
                self.seen.lock().unwrap().push(task.task_id());
                Ok(())
            }
        }

        let graph = graph_with(&["a", "b"], Pipeline::new().with_task("lint", TaskDefinition::new()));
        let adapter = PackageTaskVisitor::new(
            Arc::clone(&graph),
            Recorder {
                seen: Mutex::new(Vec::new()),
            },
        );
        let ctx = VisitContext::new();
        for id in ["a#lint", "b#lint"] {
            adapter.visit(&ctx, id).unwrap();
        }

        assert_eq!(adapter.visitor.seen.lock().unwrap().clone(), vec!["a#lint", "b#lint"]);
    }

    fn concurrent_pipeline() -> Pipeline {
        Pipeline::new()
            .with_task("build", TaskDefinition::new().with_depends_on("^build"))
            .with_task("test", TaskDefinition::new().with_depends_on("build"))
            .with_task("lint", TaskDefinition::new().with_cache(false))
            .with_task("C#lint", TaskDefinition::new().with_persistent(true))
    }

    fn record_all(
        adapter: &PackageTaskVisitor<impl TaskVisitor<Error = BuildFailed>>,
        ids: &[&str],
    ) -> Vec<Result<(), String>> {
        let ctx = VisitContext::new();
        ids.iter()
            .map(|id| adapter.visit(&ctx, id).map_err(|e| e.to_string()))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_visits_match_sequential() {
        let graph = graph_with(&["A", "B", "C"], concurrent_pipeline());
        let ids = ["A#build", "B#test", "C#lint"];

        let sequential_seen = Mutex::new(HashMap::new());
        let sequential = graph.package_task_visitor(|_ctx: &VisitContext, task: PackageTask| {
            sequential_seen
                .lock()
                .unwrap()
                .insert(task.task_id(), task.definition);
            Ok::<(), BuildFailed>(())
        });
        let sequential_results = record_all(&sequential, &ids);
        drop(sequential);
        let sequential_seen = sequential_seen.into_inner().unwrap();

        let concurrent_seen = Arc::new(Mutex::new(HashMap::new()));
        let sink = Arc::clone(&concurrent_seen);
        let concurrent = Arc::new(graph.package_task_visitor(
            move |_ctx: &VisitContext, task: PackageTask| {
                sink.lock().unwrap().insert(task.task_id(), task.definition);
                Ok::<(), BuildFailed>(())
            },
        ));

        let ctx = VisitContext::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            for id in ids {
                let adapter = Arc::clone(&concurrent);
                let ctx = ctx.clone();
                handles.push(tokio::spawn(async move {
                    (id, adapter.visit(&ctx, id).map_err(|e| e.to_string()))
                }));
            }
        }

        for handle in handles {
            let (id, result) = handle.await.unwrap();
            let index = ids.iter().position(|i| *i == id).unwrap();
            assert_eq!(result, sequential_results[index]);
        }

        let concurrent_seen = concurrent_seen.lock().unwrap();
        assert_eq!(*concurrent_seen, sequential_seen);
        assert!(concurrent_seen["C#lint"].persistent);
        assert_eq!(concurrent_seen["B#test"].depends_on, vec!["build"]);
    }

    #[test]
    fn test_scoped_threads_share_one_adapter() {
        let graph = graph_with(&["A", "B", "C"], concurrent_pipeline());
        let count = AtomicUsize::new(0);
        let adapter = graph.package_task_visitor(|_ctx: &VisitContext, _task: PackageTask| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok::<(), BuildFailed>(())
        });
        let ctx = VisitContext::new();

        std::thread::scope(|scope| {
            for id in ["A#build", "B#test", "C#lint", "D#lint"] {
                let adapter = &adapter;
                let ctx = &ctx;
                scope.spawn(move || {
                    let result = adapter.visit(ctx, id);
                    assert_eq!(result.is_ok(), id != "D#lint");
                });
            }
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_dry_run_walk_in_dependency_order() {
        let config: tessera_core::Config = toml::from_str(
            r#"
[pipeline.build]
depends_on = ["^build"]
outputs = ["dist/**"]

[pipeline."docs#build"]
cache = false
"#,
        )
        .unwrap();
        let infos: WorkspaceInfos = vec![
            WorkspaceInfo::new("docs", "apps/docs").with_dependency("ui"),
            WorkspaceInfo::new("ui", "packages/ui").with_dependency("utils"),
            WorkspaceInfo::new("utils", "packages/utils"),
        ]
        .into_iter()
        .collect();
        let workspace_graph = WorkspaceGraph::from_infos(&infos).unwrap();
        let graph = Arc::new(CompleteGraph::new(
            workspace_graph,
            Pipeline::from_config(&config),
            infos,
            "lockfile-hash",
        ));

        let plan = Mutex::new(Vec::new());
        let adapter = graph.package_task_visitor(|_ctx: &VisitContext, task: PackageTask| {
            plan.lock()
                .unwrap()
                .push((task.task_id(), task.definition.cache));
            Ok::<(), BuildFailed>(())
        });

        let ctx = VisitContext::new();
        for workspace in graph.workspace_graph().sorted() {
            if workspace == graph.root_node() {
                continue;
            }
            adapter
                .visit(&ctx, &crate::task::task_id(&workspace, "build"))
                .unwrap();
        }
        drop(adapter);

        assert_eq!(
            plan.into_inner().unwrap(),
            vec![
                ("utils#build".to_string(), true),
                ("ui#build".to_string(), true),
                ("docs#build".to_string(), false),
            ]
        );
    }
}
