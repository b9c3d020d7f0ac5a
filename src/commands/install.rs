use anyhow::Result;
use log::debug;

use crate::application::{AddOptions, AddOutcome, BuildFileSynchronizer, Resolver};
use crate::runtime::Runtime;

use super::config::Config;
use super::{ensure_build_file, print_report};

/// Add a package to the project and regenerate `go.mod`
#[tracing::instrument(skip(config))]
pub async fn install<R: Runtime>(
    config: &Config<R>,
    uri: &str,
    name: &str,
    options: AddOptions,
) -> Result<()> {
    let store = config.manifest_store();
    let mut manifest = store.load()?;
    ensure_build_file(config, &manifest.name).await?;

    let resolver = Resolver::new(
        &config.runtime,
        &config.project_root,
        &config.cache_root,
        &config.toolchain,
    );
    let outcome = resolver
        .add_package(&mut manifest, uri, name, &options)
        .await?;
    debug!("Install outcome for {}: {:?}", name, outcome);

    match &outcome {
        AddOutcome::FetchFailed(e) => {
            println!("Could not fetch {} ({:#}); {} was not added.", uri, e, name);
            return Ok(());
        }
        AddOutcome::Fetched => println!("Fetched {}", uri),
        AddOutcome::Reused => println!(
            "Using cached {} at {}",
            name,
            resolver.cache().path_for(name).display()
        ),
        AddOutcome::Cloned { nested } => {
            println!(
                "Cloned {} into {}",
                uri,
                resolver.cache().path_for(name).display()
            );
            if let Some(report) = nested {
                print_report(report);
            }
        }
    }

    BuildFileSynchronizer::new(&config.runtime, &config.project_root, &config.cache_root)
        .synchronize(&manifest)?;
    println!("Added {}", name);

    if let AddOutcome::Cloned {
        nested: Some(report),
    } = &outcome
        && !report.is_success()
    {
        anyhow::bail!(
            "{} package(s) of {} failed to restore",
            report.failures.len(),
            name
        );
    }
    Ok(())
}
