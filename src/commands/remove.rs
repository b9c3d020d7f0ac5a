use anyhow::Result;
use log::debug;

use crate::application::{BuildFileSynchronizer, Resolver};
use crate::runtime::Runtime;

use super::config::Config;

/// Remove a package from the project and regenerate `go.mod`
///
/// The cached checkout of a private package is kept.
#[tracing::instrument(skip(config))]
pub fn remove<R: Runtime>(config: &Config<R>, name: &str) -> Result<()> {
    let store = config.manifest_store();
    let mut manifest = store.load()?;

    let resolver = Resolver::new(
        &config.runtime,
        &config.project_root,
        &config.cache_root,
        &config.toolchain,
    );
    if !resolver.delete_package(&mut manifest, name) {
        println!("{} is not in the manifest.", name);
        return Ok(());
    }

    debug!("Synchronizing after removing {}", name);
    BuildFileSynchronizer::new(&config.runtime, &config.project_root, &config.cache_root)
        .synchronize(&manifest)?;
    println!("Removed {}", name);
    Ok(())
}
