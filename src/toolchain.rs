//! The external collaborators: the Go toolchain and git.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::runtime::{Invocation, ProcessRunner};

/// Target of a cross-compiling `go build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub os: String,
    pub arch: String,
    pub output: String,
    pub target: String,
}

/// Named wrappers around `go` and `git` invocations.
pub struct Toolchain {
    runner: Arc<dyn ProcessRunner>,
    go: String,
    git: String,
}

impl Toolchain {
    pub fn new(runner: Arc<dyn ProcessRunner>, go: impl Into<String>, git: impl Into<String>) -> Self {
        Self {
            runner,
            go: go.into(),
            git: git.into(),
        }
    }

    /// `go get <uri>` in the project root.
    pub async fn fetch_package(&self, uri: &str, project_root: &Path) -> Result<()> {
        self.runner
            .run(&Invocation::new(&self.go, ["get", uri]).in_dir(project_root))
            .await
    }

    /// `git clone <uri> <name>` inside the cache root.
    pub async fn clone_repository(&self, uri: &str, name: &str, cache_root: &Path) -> Result<()> {
        self.runner
            .run(&Invocation::new(&self.git, ["clone", uri, name]).in_dir(cache_root))
            .await
    }

    /// `go mod init <module>` in `dir`.
    pub async fn init_module(&self, module: &str, dir: &Path) -> Result<()> {
        self.runner
            .run(&Invocation::new(&self.go, ["mod", "init", module]).in_dir(dir))
            .await
    }

    /// `go mod tidy` in `dir`.
    pub async fn tidy(&self, dir: &Path) -> Result<()> {
        self.runner
            .run(&Invocation::new(&self.go, ["mod", "tidy"]).in_dir(dir))
            .await
    }

    /// `go build -o <output> <target>` with `GOOS`/`GOARCH` set for this call only.
    pub async fn build(&self, target: &BuildTarget, dir: &Path) -> Result<()> {
        let invocation = Invocation::new(
            &self.go,
            ["build", "-o", target.output.as_str(), target.target.as_str()],
        )
        .in_dir(dir)
        .env("GOOS", &target.os)
        .env("GOARCH", &target.arch);
        self.runner.run(&invocation).await
    }
}
