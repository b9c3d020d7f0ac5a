use anyhow::Result;
use log::debug;

use crate::error::GopkError;
use crate::manifest::Manifest;
use crate::runtime::Runtime;

use super::config::Config;
use super::ensure_build_file;

/// Create the manifest for a new project
#[tracing::instrument(skip(config))]
pub async fn init<R: Runtime>(config: &Config<R>, name: &str, version: &str) -> Result<()> {
    let manifest = Manifest::new(name, version)?;
    let store = config.manifest_store();
    if store.exists() {
        return Err(GopkError::AlreadyExists(store.manifest_path()).into());
    }

    ensure_build_file(config, &manifest.name).await?;
    debug!("Writing manifest to {:?}", store.manifest_path());
    store.create(&manifest)?;

    println!(
        "Initialized {} {} in {}",
        manifest.name,
        manifest.version,
        config.project_root.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockProcessRunner, RealRuntime};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn config(project: &Path, runner: MockProcessRunner) -> Config<RealRuntime> {
        Config::new(
            RealRuntime,
            Arc::new(runner),
            Some(project.to_path_buf()),
            Some(project.join("cache")),
            "go",
            "git",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_init_writes_manifest_and_module() {
        let dir = tempdir().unwrap();
        let mut runner = MockProcessRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.args == ["mod", "init", "example.com/app"])
            .times(1)
            .returning(|inv| {
                fs::write(
                    inv.cwd.as_ref().unwrap().join("go.mod"),
                    "module example.com/app\n",
                )?;
                Ok(())
            });
        let config = config(dir.path(), runner);

        init(&config, "example.com/app", "v0.1.0").await.unwrap();

        let loaded = config.manifest_store().load().unwrap();
        assert_eq!(loaded, Manifest::new("example.com/app", "v0.1.0").unwrap());
        assert!(dir.path().join("go.mod").exists());
    }

    #[tokio::test]
    async fn test_init_refuses_existing_manifest() {
        let dir = tempdir().unwrap();
        let original = r#"{ "name": "old", "version": "v1", "packages": {} }"#;
        fs::write(dir.path().join("package.json"), original).unwrap();

        let mut runner = MockProcessRunner::new();
        runner.expect_run().never();
        let config = config(dir.path(), runner);

        let err = init(&config, "example.com/app", "v0.1.0").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<GopkError>(),
            Some(GopkError::AlreadyExists(_))
        ));
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            original
        );
    }

    #[tokio::test]
    async fn test_init_rejects_empty_version() {
        let dir = tempdir().unwrap();
        let mut runner = MockProcessRunner::new();
        runner.expect_run().never();
        let config = config(dir.path(), runner);

        let err = init(&config, "example.com/app", " ").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<GopkError>(),
            Some(GopkError::Validation { field: "version", .. })
        ));
        assert!(!dir.path().join("package.json").exists());
    }
}
