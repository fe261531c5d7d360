//! Source checkouts (git worktrees off shared bare clones) and Python
//! environments (uv-managed venvs), both kept under the data directory:
//!
//! ```text
//! ~/.local/share/odev/
//! ├── odoo.git/                 bare clone
//! ├── enterprise.git/           bare clone
//! ├── 17.0/odoo/                worktree
//! ├── 17.0/enterprise/          worktree
//! └── venvs/odoo-17.0-py3.12/
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use odev_config::paths::data_dir;
use odev_core::UserError;
use odev_core::Version;
use odev_core::collaborators::{EnvHandle, EnvironmentProvisioner, SourceCheckout, SourceProvider};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

const ODOO_URL: &str = "git@github.com:odoo/odoo.git";
const ENTERPRISE_URL: &str = "git@github.com:odoo/enterprise.git";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Result<Self> {
        data_dir()
            .map(Self::new)
            .context("Could not determine the data directory")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bare_repo(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.git"))
    }

    pub fn worktree(&self, version: Version, name: &str) -> PathBuf {
        self.root.join(version.to_string()).join(name)
    }

    pub fn venvs_dir(&self) -> PathBuf {
        self.root.join("venvs")
    }

    pub fn venv_path(&self, version: Version, python: &str) -> PathBuf {
        self.venvs_dir().join(format!("odoo-{version}-py{python}"))
    }

    /// Python version of the newest existing venv for `version`.
    pub fn latest_python(&self, version: Version) -> Option<String> {
        let prefix = format!("odoo-{version}-py");
        let entries = std::fs::read_dir(self.venvs_dir()).ok()?;
        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_prefix(&prefix))
                    .map(str::to_string)
            })
            .max_by_key(|python| python_sort_key(python))
    }
}

/// `3.12` sorts after `3.9`.
fn python_sort_key(version: &str) -> Vec<u32> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

/// Run to completion with output captured; a non-zero exit is a
/// [`UserError::CommandFailed`].
async fn run_checked(cmd: &mut Command) -> Result<()> {
    let rendered = render(cmd);
    debug!(command = %rendered, "running");
    let output = cmd
        .output()
        .await
        .with_context(|| format!("Failed to execute `{rendered}`"))?;
    if !output.status.success() {
        debug!(stderr = %String::from_utf8_lossy(&output.stderr), "command failed");
        return Err(UserError::CommandFailed {
            command: rendered,
            exit_code: output.status.code().unwrap_or(1),
        }
        .into());
    }
    Ok(())
}

async fn succeeds(cmd: &mut Command) -> bool {
    cmd.output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn render(cmd: &Command) -> String {
    let std_cmd = cmd.as_std();
    std::iter::once(std_cmd.get_program())
        .chain(std_cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn require_tool(name: &str) -> Result<()> {
    which::which(name)
        .map(|_| ())
        .with_context(|| format!("'{name}' not found in PATH; install it and retry"))
}

pub struct GitSourceProvider {
    workspace: Workspace,
}

impl GitSourceProvider {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn ensure_worktree(&self, version: Version, name: &str, url: &str) -> Result<PathBuf> {
        let worktree = self.workspace.worktree(version, name);
        if worktree.exists() {
            return Ok(worktree);
        }

        let bare = self.workspace.bare_repo(name);
        if !bare.exists() {
            info!(url, "cloning bare repository");
            tokio::fs::create_dir_all(self.workspace.root()).await?;
            run_checked(Command::new("git").args(["clone", "--bare", url]).arg(&bare)).await?;
        }

        if let Some(parent) = worktree.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        info!(%version, name, "adding worktree");
        run_checked(
            Command::new("git")
                .args(["worktree", "add"])
                .arg(&worktree)
                .arg(version.to_string())
                .current_dir(&bare),
        )
        .await?;
        Ok(worktree)
    }
}

#[async_trait]
impl SourceProvider for GitSourceProvider {
    async fn ensure_checkout(&self, version: Version, enterprise: bool) -> Result<SourceCheckout> {
        require_tool("git")?;
        let odoo = self.ensure_worktree(version, "odoo", ODOO_URL).await?;
        let enterprise = if enterprise {
            Some(
                self.ensure_worktree(version, "enterprise", ENTERPRISE_URL)
                    .await?,
            )
        } else {
            None
        };
        Ok(SourceCheckout { odoo, enterprise })
    }
}

pub struct UvProvisioner {
    workspace: Workspace,
}

impl UvProvisioner {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    fn uv(venv: &Path) -> Command {
        let mut cmd = Command::new("uv");
        cmd.env("VIRTUAL_ENV", venv);
        cmd
    }

    async fn is_ready(venv: &Path) -> bool {
        venv.is_dir() && succeeds(Self::uv(venv).args(["pip", "show", "odoo"])).await
    }

    async fn create(&self, python: &str, venv: &Path, checkout: &SourceCheckout) -> Result<()> {
        if !succeeds(Command::new("uv").args(["python", "find", python])).await {
            info!(python, "installing python");
            run_checked(Command::new("uv").args(["python", "install", python])).await?;
        }

        if !venv.exists() {
            if let Some(parent) = venv.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            info!(venv = %venv.display(), "creating virtual environment");
            run_checked(
                Command::new("uv")
                    .args(["venv", "--python", python])
                    .arg(venv),
            )
            .await?;
        }

        let editable = format!("file://{}#egg=odoo", checkout.odoo.display());
        run_checked(Self::uv(venv).args(["pip", "install", "-e"]).arg(editable)).await?;

        let requirements = checkout.odoo.join("requirements.txt");
        if requirements.is_file() {
            run_checked(
                Self::uv(venv)
                    .args(["pip", "install", "-r"])
                    .arg(&requirements),
            )
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EnvironmentProvisioner for UvProvisioner {
    async fn ensure_ready(
        &self,
        version: Version,
        python_version: Option<&str>,
        checkout: &SourceCheckout,
        extra_packages: &[String],
    ) -> Result<EnvHandle> {
        require_tool("uv")?;
        let python = match python_version {
            Some(python) => python.to_string(),
            None => self
                .workspace
                .latest_python(version)
                .ok_or_else(|| UserError::PythonVersionRequired(version.to_string()))?,
        };
        let venv = self.workspace.venv_path(version, &python);

        if !Self::is_ready(&venv).await {
            self.create(&python, &venv, checkout).await?;
        }

        if !extra_packages.is_empty() {
            info!(count = extra_packages.len(), "installing extra python packages");
            run_checked(Self::uv(&venv).args(["pip", "install"]).args(extra_packages)).await?;
        }

        Ok(EnvHandle {
            venv_path: venv,
            python_version: python,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn layout_follows_version_and_python() {
        let ws = Workspace::new("/data/odev");
        let v17 = Version::new(17.0);

        assert_eq!(ws.bare_repo("odoo"), PathBuf::from("/data/odev/odoo.git"));
        assert_eq!(
            ws.worktree(v17, "enterprise"),
            PathBuf::from("/data/odev/17.0/enterprise")
        );
        assert_eq!(
            ws.venv_path(v17, "3.12"),
            PathBuf::from("/data/odev/venvs/odoo-17.0-py3.12")
        );
    }

    #[test]
    fn latest_python_compares_numerically() {
        let dir = tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        for name in ["odoo-17.0-py3.9", "odoo-17.0-py3.12", "odoo-16.0-py3.13"] {
            std::fs::create_dir_all(ws.venvs_dir().join(name)).unwrap();
        }

        assert_eq!(ws.latest_python(Version::new(17.0)).as_deref(), Some("3.12"));
        assert_eq!(ws.latest_python(Version::new(18.0)), None);
    }

    #[test]
    fn latest_python_without_venvs_dir_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(Workspace::new(dir.path()).latest_python(Version::new(17.0)), None);
    }

    #[tokio::test]
    async fn run_checked_maps_failure_to_command_failed() {
        let err = run_checked(Command::new("sh").args(["-c", "exit 3"]))
            .await
            .unwrap_err();

        match err.downcast_ref::<UserError>() {
            Some(UserError::CommandFailed { command, exit_code }) => {
                assert_eq!(*exit_code, 3);
                assert_eq!(command, "sh -c exit 3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_checked_accepts_success() {
        run_checked(&mut Command::new("true")).await.unwrap();
    }
}
