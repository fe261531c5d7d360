use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// XDG application name for config and data directories.
pub const APP_NAME: &str = "odev";

/// Recognized config file names, highest precedence first within a directory.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".odev.toml", "odev.toml"];

/// Where config files are searched for.
///
/// Threaded explicitly through every resolver call so tests can point it at
/// temporary directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigContext {
    pub cwd: PathBuf,
    pub user_config_dir: Option<PathBuf>,
    pub file_names: Vec<String>,
}

impl ConfigContext {
    pub fn new(cwd: impl Into<PathBuf>, user_config_dir: Option<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            user_config_dir,
            file_names: CONFIG_FILE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Context for the running process: current directory plus the XDG config dir.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Ok(Self::new(cwd, user_config_dir()))
    }

    /// Candidate file locations in precedence order, existing or not.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.cwd.as_path()];
        if let Some(user_dir) = &self.user_config_dir {
            dirs.push(user_dir.as_path());
        }
        dirs.into_iter()
            .flat_map(|dir| self.file_names.iter().map(move |name| dir.join(name)))
            .collect()
    }

    /// File new profiles are saved to when created in the current directory.
    pub fn cwd_save_path(&self) -> PathBuf {
        self.cwd.join(self.unhidden_file_name())
    }

    /// File new profiles are saved to in the user config directory.
    pub fn user_save_path(&self) -> Option<PathBuf> {
        self.user_config_dir
            .as_ref()
            .map(|dir| dir.join(self.unhidden_file_name()))
    }

    fn unhidden_file_name(&self) -> &str {
        self.file_names
            .iter()
            .find(|name| !name.starts_with('.'))
            .or_else(|| self.file_names.last())
            .map(String::as_str)
            .unwrap_or(CONFIG_FILE_NAMES[1])
    }
}

/// `~/.config/odev` on Linux.
pub fn user_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// `~/.local/share/odev` on Linux: bare repos, worktrees and venvs.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Make `path` absolute relative to `base`, expanding a leading `~`.
///
/// Normalization is lexical: the path does not need to exist, and symlinks
/// are not followed. `link/..` collapses to the directory holding `link`,
/// which differs from what the filesystem resolves when `link` points
/// elsewhere.
pub fn resolve_against(path: &Path, base: &Path) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        normalize_lexically(&expanded)
    } else {
        normalize_lexically(&base.join(expanded))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
