use odev_config::paths::resolve_against;
use odev_core::{Profile, Version, split_modules};
use std::path::Path;

use crate::cli::RunArgs;

/// Overrides the user actually supplied on the command line.
///
/// The profile selector is never part of it; `--module` is renamed to
/// `modules` and split on commas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliParams {
    overlay: Profile,
    module_arg: Option<String>,
}

impl CliParams {
    /// Relative `--path` values are resolved against `cwd`.
    pub fn from_args(args: &RunArgs, cwd: &Path) -> Self {
        let overlay = Profile {
            modules: args.module.as_deref().map(split_modules),
            version: args.version.and_then(Version::finite),
            python_version: args.python_version.clone(),
            db: args.db.clone(),
            paths: (!args.paths.is_empty()).then(|| {
                args.paths
                    .iter()
                    .map(|p| resolve_against(p, cwd))
                    .collect()
            }),
            enterprise: args.enterprise.then_some(true),
            force_install: args.force_install.then_some(true),
            force_update: args.force_update.then_some(true),
            extra_params: args.extra_params.clone(),
            ..Default::default()
        };
        Self {
            overlay,
            module_arg: args.module.clone(),
        }
    }

    pub fn overlay(&self) -> &Profile {
        &self.overlay
    }

    /// The raw `--module` string, before splitting.
    pub fn module_arg(&self) -> Option<&str> {
        self.module_arg.as_deref()
    }

    /// True when no override was passed (a profile name alone does not count).
    pub fn is_empty(&self) -> bool {
        self.overlay.is_empty()
    }

    /// Whether an ad-hoc run is possible: both modules and version supplied.
    pub fn has_required(&self) -> bool {
        self.overlay.modules.is_some() && self.overlay.version.is_some()
    }
}
