//! External process invocation.
//!
//! Every collaborator call carries its own working directory and environment;
//! nothing here touches the process-global current directory or environment.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::GopkError;

/// A single external command: program, arguments, working directory and
/// extra environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs external commands to completion.
///
/// Output of the child goes straight to the terminal; callers only see
/// success or an `ExternalFailure`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<()>;
}

pub struct RealProcessRunner;

#[async_trait]
impl ProcessRunner for RealProcessRunner {
    #[tracing::instrument(skip(self), fields(command = %invocation))]
    async fn run(&self, invocation: &Invocation) -> Result<()> {
        debug!("Running `{}` in {:?}", invocation, invocation.cwd);

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null());
        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }

        let status = command
            .status()
            .await
            .map_err(|e| GopkError::ExternalFailure {
                command: invocation.to_string(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(GopkError::ExternalFailure {
                command: invocation.to_string(),
                reason: format!("exited with {}", status),
            }
            .into());
        }

        Ok(())
    }
}
