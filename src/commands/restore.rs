use anyhow::Result;
use log::warn;

use crate::application::{BuildFileSynchronizer, RestoreOptions, Restorer};
use crate::runtime::Runtime;

use super::config::Config;
use super::{ensure_build_file, print_report};

/// Materialize every package in the manifest and regenerate `go.mod`
///
/// `go.mod` and the manifest are still written when some packages fail; the
/// command then exits non-zero.
#[tracing::instrument(skip(config))]
pub async fn restore<R: Runtime>(config: &Config<R>, options: RestoreOptions) -> Result<()> {
    let store = config.manifest_store();
    let manifest = store.load()?;
    ensure_build_file(config, &manifest.name).await?;

    println!(
        "Restoring {} package(s) for {}",
        manifest.packages.len(),
        manifest.name
    );
    let restorer = Restorer::new(&config.runtime, &config.cache_root, &config.toolchain);
    let report = restorer
        .restore(&config.project_root, &manifest, &options)
        .await?;

    BuildFileSynchronizer::new(&config.runtime, &config.project_root, &config.cache_root)
        .synchronize(&manifest)?;

    if options.tidy
        && let Err(e) = config.toolchain.tidy(&config.project_root).await
    {
        warn!("Failed to tidy {}: {:#}", config.project_root.display(), e);
        println!("Warning: go mod tidy failed in the project root");
    }

    print_report(&report);
    if !report.is_success() {
        anyhow::bail!("{} package(s) failed to restore", report.failures.len());
    }
    Ok(())
}
