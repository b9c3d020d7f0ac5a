use anyhow::Result;
use log::debug;

use crate::runtime::Runtime;
use crate::toolchain::BuildTarget;

use super::config::Config;

/// Cross-compile the project for `target.os`/`target.arch`
#[tracing::instrument(skip(config))]
pub async fn build<R: Runtime>(config: &Config<R>, target: BuildTarget) -> Result<()> {
    debug!("Building {:?} in {:?}", target, config.project_root);
    config.toolchain.build(&target, &config.project_root).await?;
    println!(
        "Built {} for {}/{} -> {}",
        target.target, target.os, target.arch, target.output
    );
    Ok(())
}
