//! Declarative project manifest: module identity plus declared packages.

mod store;

pub use store::{MANIFEST_FILE_NAME, ManifestStore};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path};

use crate::error::GopkError;

/// A project's module name, version and package set as persisted in
/// `package.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub packages: BTreeMap<String, PackageRecord>,
}

/// One declared dependency.
///
/// `uri` is the location the package is fetched from: the module path for
/// public packages, the clone URL for private ones. The local checkout of a
/// private package is always derived from its name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub uri: String,
    pub private: bool,
}

impl Manifest {
    pub fn new(name: &str, version: &str) -> Result<Self, GopkError> {
        let manifest = Manifest {
            name: name.to_string(),
            version: version.to_string(),
            packages: BTreeMap::new(),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), GopkError> {
        if self.name.trim().is_empty() {
            return Err(empty("name"));
        }
        if self.version.trim().is_empty() {
            return Err(empty("version"));
        }
        self.packages
            .keys()
            .try_for_each(|name| validate_package_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Insert a new record. Names are never overwritten.
    pub fn insert(&mut self, name: &str, record: PackageRecord) -> Result<(), GopkError> {
        validate_package_name(name)?;
        if self.contains(name) {
            return Err(GopkError::DuplicatePackage(name.to_string()));
        }
        self.packages.insert(name.to_string(), record);
        Ok(())
    }

    /// Remove a record, returning it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<PackageRecord> {
        self.packages.remove(name)
    }

    pub fn private_packages(&self) -> impl Iterator<Item = (&String, &PackageRecord)> {
        self.packages.iter().filter(|(_, record)| record.private)
    }
}

/// Check that `name` can live under the cache root: one or more plain path
/// segments, never absolute and never `.` or `..`.
pub fn validate_package_name(name: &str) -> Result<(), GopkError> {
    let mut components = Path::new(name).components().peekable();
    let plain = !name.trim().is_empty()
        && components.peek().is_some()
        && components.all(|c| matches!(c, Component::Normal(_)));

    if plain {
        Ok(())
    } else {
        Err(GopkError::Validation {
            field: "package name",
            reason: format!("'{}' must be a relative path without '.' or '..'", name),
        })
    }
}

fn empty(field: &'static str) -> GopkError {
    GopkError::Validation {
        field,
        reason: "must not be empty".into(),
    }
}
