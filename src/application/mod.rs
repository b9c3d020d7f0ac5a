//! Application layer - Use cases that coordinate the manifest, the package
//! cache and the toolchain.
//!
//! Commands build these from a [`Config`](crate::commands::config::Config) and
//! only deal with printing results.

mod resolver;
mod restore;
mod sync;

pub use resolver::{AddOptions, AddOutcome, Resolver};
pub use restore::{PackageFailure, RestoreOptions, RestoreReport, Restorer};
pub use sync::BuildFileSynchronizer;
