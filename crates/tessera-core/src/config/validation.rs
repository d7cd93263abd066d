//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{Config, TaskDefinition, UPSTREAM_PREFIX};

/// Separator between workspace and task name in a qualified pipeline key
pub const TASK_DELIMITER: char = '#';

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!(tasks = config.pipeline.len(), "validating configuration");
    validate_globals(config)?;
    for (key, definition) in &config.pipeline {
        validate_pipeline_key(key)?;
        validate_task(key, definition)?;
    }
    debug!("configuration validation passed");
    Ok(())
}

fn validate_globals(config: &Config) -> Result<()> {
    if config.global_dependencies.iter().any(|g| g.trim().is_empty()) {
        return Err(invalid(
            "global_dependencies",
            "entries cannot be empty".to_string(),
        ));
    }
    if config.global_env.iter().any(|e| e.trim().is_empty()) {
        return Err(invalid("global_env", "entries cannot be empty".to_string()));
    }
    Ok(())
}

/// Check a pipeline key: either `task` or `workspace#task`
fn validate_pipeline_key(key: &str) -> Result<()> {
    let field = format!("pipeline.{}", key);
    if key.trim().is_empty() {
        return Err(invalid("pipeline", "task names cannot be empty".to_string()));
    }

    let parts: Vec<&str> = key.split(TASK_DELIMITER).collect();
    match parts.as_slice() {
        [_] => Ok(()),
        [workspace, task] if !workspace.is_empty() && !task.is_empty() => Ok(()),
        _ => Err(invalid(
            &field,
            format!(
                "must be a task name or \"workspace{}task\"",
                TASK_DELIMITER
            ),
        )),
    }
}

fn validate_task(key: &str, definition: &TaskDefinition) -> Result<()> {
    for dep in &definition.depends_on {
        let name = dep.strip_prefix(UPSTREAM_PREFIX).unwrap_or(dep);
        if name.trim().is_empty() {
            return Err(invalid(
                &format!("pipeline.{}.depends_on", key),
                format!("invalid dependency '{}'", dep),
            ));
        }
    }

    if definition.outputs.iter().any(|o| o.trim().is_empty()) {
        return Err(invalid(
            &format!("pipeline.{}.outputs", key),
            "output globs cannot be empty".to_string(),
        ));
    }

    if definition.inputs.iter().any(|i| i.trim().is_empty()) {
        return Err(invalid(
            &format!("pipeline.{}.inputs", key),
            "input globs cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn invalid(field: &str, message: String) -> crate::error::TesseraError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message,
    }
    .into()
}
