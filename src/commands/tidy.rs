use anyhow::Result;

use crate::runtime::Runtime;

use super::config::Config;

/// Run `go mod tidy` in the project root
#[tracing::instrument(skip(config))]
pub async fn tidy<R: Runtime>(config: &Config<R>) -> Result<()> {
    config.toolchain.tidy(&config.project_root).await?;
    println!("Tidied {}", config.project_root.display());
    Ok(())
}
