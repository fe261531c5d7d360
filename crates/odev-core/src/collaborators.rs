//! Capabilities the run pipeline consumes but does not specify:
//! source checkouts, Python environments and process launching.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::profile::Version;

/// Worktrees for one application release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCheckout {
    pub odoo: PathBuf,
    pub enterprise: Option<PathBuf>,
}

#[async_trait]
pub trait SourceProvider: Send + Sync {
    async fn ensure_checkout(&self, version: Version, enterprise: bool) -> Result<SourceCheckout>;
}

/// A ready-to-use virtual environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvHandle {
    pub venv_path: PathBuf,
    pub python_version: String,
}

#[async_trait]
pub trait EnvironmentProvisioner: Send + Sync {
    /// Create (or reuse) the environment for `version`.
    ///
    /// `python_version = None` means "reuse the newest existing environment".
    async fn ensure_ready(
        &self,
        version: Version,
        python_version: Option<&str>,
        checkout: &SourceCheckout,
        extra_packages: &[String],
    ) -> Result<EnvHandle>;
}

/// Fully built command line for the target application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub exit_code: i32,
}

impl LaunchOutcome {
    pub fn success(self) -> bool {
        self.exit_code == 0
    }
}

#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn launch(&self, invocation: &Invocation) -> Result<LaunchOutcome>;
}
