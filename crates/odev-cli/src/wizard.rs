use anyhow::{Context, Result, bail};
use odev_config::paths::resolve_against;
use odev_config::{ConfigContext, ConfigFile};
use odev_core::{Profile, Reporter, Version, split_modules};
use std::path::{Path, PathBuf};

/// A profile created interactively and already saved to `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedProfile {
    pub name: String,
    pub profile: Profile,
    pub path: PathBuf,
}

pub trait ProfileWizard {
    fn create(&self, ctx: &ConfigContext, reporter: &dyn Reporter) -> Result<CreatedProfile>;
}

/// Asks for every profile field through the reporter, then saves the result
/// in the current directory or in the user config directory.
pub struct InteractiveWizard;

impl ProfileWizard for InteractiveWizard {
    fn create(&self, ctx: &ConfigContext, reporter: &dyn Reporter) -> Result<CreatedProfile> {
        let name = reporter
            .prompt_text("Enter a profile name", Some("default"))?
            .trim()
            .to_string();
        if name.is_empty() {
            bail!("Profile name cannot be empty");
        }

        let modules =
            split_modules(&reporter.prompt_text("Enter comma-separated module names", None)?);
        if modules.is_empty() {
            bail!("At least one module is required");
        }

        let version_input = reporter.prompt_text("Enter Odoo version", None)?;
        let version = version_input
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Version::finite)
            .with_context(|| format!("Invalid Odoo version '{}'", version_input.trim()))?;

        let mut profile = Profile {
            modules: Some(modules.clone()),
            version: Some(version),
            ..Default::default()
        };

        profile.python_version =
            non_blank(reporter.prompt_text("Enter Python version", Some("3.12"))?);

        let default_db = format!("v{}_{}", version.major(), modules.join("_"));
        profile.db = non_blank(reporter.prompt_text("Enter database name", Some(&default_db))?);

        let paths_input = reporter.prompt_text("Enter comma-separated paths for modules", Some(""))?;
        let paths: Vec<PathBuf> = paths_input
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| resolve_against(Path::new(p), &ctx.cwd))
            .collect();
        if !paths.is_empty() {
            profile.paths = Some(paths);
        }

        profile.enterprise = Some(reporter.confirm("Is this an enterprise version?", false)?);
        profile.force_install = Some(reporter.confirm("Force install modules?", false)?);
        profile.force_update = Some(reporter.confirm("Force update modules?", false)?);

        profile.extra_params =
            non_blank(reporter.prompt_text("Enter extra parameters for Odoo", Some(""))?);

        let packages = split_modules(
            &reporter.prompt_text("Enter comma-separated python packages", Some(""))?,
        );
        if !packages.is_empty() {
            profile.python_packages = Some(packages);
        }

        let path = if reporter.confirm("Save configuration in the current directory?", false)? {
            ctx.cwd_save_path()
        } else {
            ctx.user_save_path().unwrap_or_else(|| ctx.cwd_save_path())
        };

        ConfigFile::open(&path)?.update(&name, &profile)?;

        Ok(CreatedProfile {
            name,
            profile,
            path,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
