use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Get the project root, defaulting to the current directory
#[tracing::instrument(skip(runtime))]
pub fn resolve_project_root<R: Runtime>(runtime: &R, project: Option<PathBuf>) -> Result<PathBuf> {
    match project {
        Some(path) => Ok(path),
        None => runtime
            .current_dir()
            .context("Could not determine the current directory"),
    }
}

/// Get the default package cache root
///
/// Returns: `<data dir>/gopk/packages`, or `~/.gopk/packages` when the
/// platform has no data directory.
#[tracing::instrument(skip(runtime))]
pub fn default_cache_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let root = match runtime.data_dir() {
        Some(data_dir) => data_dir.join("gopk").join("packages"),
        None => runtime
            .home_dir()
            .context("Could not find home directory")?
            .join(".gopk")
            .join("packages"),
    };

    info!("Using cache root: {}", root.display());
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{test_cache_root, test_data_dir, test_home, test_project};

    #[test]
    fn test_default_cache_root_under_data_dir() {
        let mut runtime = MockRuntime::new();
        runtime.expect_data_dir().returning(|| Some(test_data_dir()));

        assert_eq!(default_cache_root(&runtime).unwrap(), test_cache_root());
    }

    #[test]
    fn test_default_cache_root_falls_back_to_home() {
        let mut runtime = MockRuntime::new();
        runtime.expect_data_dir().returning(|| None);
        runtime.expect_home_dir().returning(|| Some(test_home()));

        let root = default_cache_root(&runtime).unwrap();

        assert_eq!(root, test_home().join(".gopk").join("packages"));
    }

    #[test]
    fn test_default_cache_root_no_home() {
        // Fails when neither a data dir nor a home dir is available
        let mut runtime = MockRuntime::new();
        runtime.expect_data_dir().returning(|| None);
        runtime.expect_home_dir().returning(|| None);

        assert!(default_cache_root(&runtime).is_err());
    }

    #[test]
    fn test_project_root_defaults_to_current_dir() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().returning(|| Ok(test_project()));

        assert_eq!(resolve_project_root(&runtime, None).unwrap(), test_project());
    }

    #[test]
    fn test_explicit_project_root_skips_discovery() {
        let runtime = MockRuntime::new();
        let root = resolve_project_root(&runtime, Some(PathBuf::from("/elsewhere"))).unwrap();
        assert_eq!(root, PathBuf::from("/elsewhere"));
    }
}
