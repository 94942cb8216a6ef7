use std::path::Path;

use crate::error::ConfigError;

use super::decode::decode_str;
use super::types::Plan;

/// Plan file used when no path is given on the command line.
pub const DEFAULT_PLAN_FILE: &str = "./cmds.yml";

/// Read and decode the plan at `path`.
pub fn load_plan(path: impl AsRef<Path>) -> Result<Plan, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let plan = decode_str(&text).map_err(|source| ConfigError::Plan {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    tracing::info!(
        path = %path.display(),
        steps = plan.step_count(),
        commands = plan.command_count(),
        "plan loaded"
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_plan(dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_decode_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmds.yml");
        std::fs::write(&path, "series:\n  - {name: nope}\n").unwrap();

        let err = load_plan(&path).unwrap_err();
        match err {
            ConfigError::Plan { path: p, source } => {
                assert_eq!(p, path);
                assert!(matches!(*source, ConfigError::UnsupportedNode(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
