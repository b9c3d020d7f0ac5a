use anyhow::Result;
use log::{debug, info};

use crate::{
    application::RestoreReport,
    buildfile::BUILD_FILE_NAME,
    runtime::Runtime,
};

pub mod config;
mod build;
mod clean;
mod init;
mod install;
mod paths;
mod remove;
mod restore;
mod tidy;

pub use build::build;
pub use clean::clean;
pub use init::init;
pub use install::install;
pub use remove::remove;
pub use restore::restore;
pub use tidy::tidy;

use config::Config;

/// Run module-init in the project root unless `go.mod` already exists
async fn ensure_build_file<R: Runtime>(config: &Config<R>, module: &str) -> Result<()> {
    let build_file = config.project_root.join(BUILD_FILE_NAME);
    if config.runtime.exists(&build_file) {
        debug!("{:?} already exists", build_file);
        return Ok(());
    }

    info!("Creating {:?} for module {}", build_file, module);
    config
        .toolchain
        .init_module(module, &config.project_root)
        .await
}

pub(crate) fn print_report(report: &RestoreReport) {
    for name in &report.fetched {
        println!("  fetched  {}", name);
    }
    for name in &report.cloned {
        println!("  cloned   {}", name);
    }
    for name in &report.reused {
        println!("  cached   {}", name);
    }
    for name in &report.nested {
        println!("  restored {}", name);
    }
    for failure in &report.failures {
        println!("  FAILED   {}: {:#}", failure.package, failure.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Invocation, MockProcessRunner, RealRuntime};
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_ensure_build_file_skips_existing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module app\n").unwrap();

        let mut runner = MockProcessRunner::new();
        runner.expect_run().never();
        let config = Config::new(
            RealRuntime,
            Arc::new(runner),
            Some(dir.path().to_path_buf()),
            Some(dir.path().join("cache")),
            "go",
            "git",
        )
        .unwrap();

        ensure_build_file(&config, "app").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_build_file_runs_module_init() {
        let dir = tempdir().unwrap();
        let project = dir.path().to_path_buf();

        let mut runner = MockProcessRunner::new();
        let expected = Invocation::new("go", ["mod", "init", "example.com/app"]).in_dir(&project);
        runner
            .expect_run()
            .withf(move |inv: &Invocation| *inv == expected)
            .times(1)
            .returning(|_| Ok(()));
        let config = Config::new(
            RealRuntime,
            Arc::new(runner),
            Some(project.clone()),
            Some(project.join("cache")),
            "go",
            "git",
        )
        .unwrap();

        ensure_build_file(&config, "example.com/app").await.unwrap();
    }
}
