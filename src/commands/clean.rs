use anyhow::{Context, Result};
use log::debug;

use crate::buildfile::{BUILD_FILE_NAME, CHECKSUM_FILE_NAME};
use crate::runtime::Runtime;

use super::config::Config;

/// Delete `go.mod` and `go.sum` from the project root
///
/// The manifest is kept; `gopk restore` regenerates both files.
#[tracing::instrument(skip(config))]
pub fn clean<R: Runtime>(config: &Config<R>) -> Result<()> {
    for file in [BUILD_FILE_NAME, CHECKSUM_FILE_NAME] {
        let path = config.project_root.join(file);
        if !config.runtime.exists(&path) {
            debug!("{:?} does not exist, skipping", path);
            continue;
        }
        config
            .runtime
            .remove_file(&path)
            .with_context(|| format!("Failed to remove {:?}", path))?;
        println!("Removed {}", path.display());
    }
    Ok(())
}
