//! Decides what configuration a run uses.
//!
//! Without overrides the user runs a stored profile (or creates one). With
//! overrides, a profile defined in the current directory may be updated in
//! place; otherwise the overrides run ad hoc. Either way the result must hold
//! non-empty modules and a version.

use anyhow::Result;
use odev_config::{
    ConfigContext, ConfigFile, MergedEntry, load_and_merge_profiles, resolve_profile_paths,
};
use odev_core::{Profile, Reporter, UserError};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli_params::CliParams;
use crate::wizard::ProfileWizard;

/// How the resolved configuration came about.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Stored profile run as-is.
    Existing { name: String, source: PathBuf },
    /// Profile created through the wizard.
    Created { name: String, source: PathBuf },
    /// Local profile overlaid with the overrides and written back.
    Updated { name: String, source: PathBuf },
    /// Overrides only; no profile read or written.
    AdHoc,
}

impl Decision {
    pub fn describe(&self) -> String {
        match self {
            Decision::Existing { name, source }
            | Decision::Created { name, source }
            | Decision::Updated { name, source } => {
                format!("profile '{name}' from {}", source.display())
            }
            Decision::AdHoc => "command-line arguments".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Negotiated {
    pub config: Profile,
    pub decision: Decision,
}

pub struct ConfigNegotiator<'a> {
    ctx: &'a ConfigContext,
    reporter: &'a dyn Reporter,
    wizard: &'a dyn ProfileWizard,
}

impl<'a> ConfigNegotiator<'a> {
    pub fn new(
        ctx: &'a ConfigContext,
        reporter: &'a dyn Reporter,
        wizard: &'a dyn ProfileWizard,
    ) -> Self {
        Self {
            ctx,
            reporter,
            wizard,
        }
    }

    pub fn negotiate(&self, profile: Option<&str>, cli: &CliParams) -> Result<Negotiated> {
        let negotiated = if cli.is_empty() {
            self.without_params(profile)?
        } else {
            self.with_params(profile, cli)?
        };

        if !negotiated.config.is_runnable() {
            return Err(UserError::IncompleteConfiguration.into());
        }
        debug!(decision = ?negotiated.decision, "configuration negotiated");
        Ok(negotiated)
    }

    fn without_params(&self, requested: Option<&str>) -> Result<Negotiated> {
        let merged = load_and_merge_profiles(self.ctx, self.reporter)?;

        if merged.is_empty() {
            return self.create_profile();
        }

        let name = match requested {
            Some(name) => name.to_string(),
            None if merged.len() == 1 => merged.names()[0].to_string(),
            None => self
                .choose("Which profile to run:", &merged.names(), false)?
                .ok_or(UserError::NoSelection)?,
        };

        let Some(entry) = merged.entry(&name) else {
            return Err(UserError::ProfileNotFound(name).into());
        };

        let prompt = format!(
            "Run with profile '{}' from {}?",
            name,
            entry.source.display()
        );
        if !self.reporter.confirm(&prompt, true)? {
            return Err(UserError::Aborted(format!("profile '{name}' was not run")).into());
        }

        Ok(Negotiated {
            config: entry.profile.clone(),
            decision: Decision::Existing {
                name,
                source: entry.source.clone(),
            },
        })
    }

    fn create_profile(&self) -> Result<Negotiated> {
        if !self
            .reporter
            .confirm("No modules to run. Would you like to create a new profile?", false)?
        {
            return Err(UserError::Aborted("no profile to run".to_string()).into());
        }

        let created = self.wizard.create(self.ctx, self.reporter)?;
        self.reporter
            .success(&format!("Created profile '{}'.", created.name));

        let mut config = created.profile;
        resolve_profile_paths(&mut config, parent_dir(&created.path));
        Ok(Negotiated {
            config,
            decision: Decision::Created {
                name: created.name,
                source: created.path,
            },
        })
    }

    fn with_params(&self, requested: Option<&str>, cli: &CliParams) -> Result<Negotiated> {
        let merged = load_and_merge_profiles(self.ctx, self.reporter)?;
        let local = merged.defined_in(&self.ctx.cwd);

        if local.is_empty() {
            return self.ad_hoc(cli);
        }

        let target = match requested {
            Some(name) => Some(name.to_string()),
            None if local.len() == 1 => Some(local[0].name.clone()),
            None => {
                let names: Vec<&str> = local.iter().map(|e| e.name.as_str()).collect();
                self.choose("Which profile to update:", &names, true)?
            }
        };

        let Some(entry) = target
            .as_deref()
            .and_then(|name| local.iter().copied().find(|e| e.name == name))
        else {
            if let Some(name) = &target {
                self.reporter.info(&format!(
                    "Profile '{name}' is not defined in {}; running with command-line arguments.",
                    self.ctx.cwd.display()
                ));
            }
            return self.ad_hoc(cli);
        };

        let prompt = format!("Update profile '{}' with provided arguments?", entry.name);
        if !self.reporter.confirm(&prompt, false)? {
            return self.ad_hoc(cli);
        }

        self.write_back(entry, cli)
    }

    /// Overlay the overrides onto the stored profile, re-read from its own
    /// file, and persist it there.
    fn write_back(&self, entry: &MergedEntry, cli: &CliParams) -> Result<Negotiated> {
        let mut file = ConfigFile::open(&entry.source)?;
        let mut stored = file.profile(&entry.name)?.unwrap_or_default();
        stored.overlay(cli.overlay());
        file.update(&entry.name, &stored)?;
        self.reporter
            .success(&format!("Profile '{}' updated.", entry.name));

        resolve_profile_paths(&mut stored, parent_dir(&entry.source));
        Ok(Negotiated {
            config: stored,
            decision: Decision::Updated {
                name: entry.name.clone(),
                source: entry.source.clone(),
            },
        })
    }

    fn ad_hoc(&self, cli: &CliParams) -> Result<Negotiated> {
        if !cli.has_required() {
            return Err(UserError::MissingRequiredParams.into());
        }
        Ok(Negotiated {
            config: cli.overlay().clone(),
            decision: Decision::AdHoc,
        })
    }

    /// Numbered-list prompt. Accepts a 1-based index or a name; blank is `None`.
    fn choose(&self, title: &str, names: &[&str], allow_none: bool) -> Result<Option<String>> {
        let mut prompt = String::from(title);
        for (i, name) in names.iter().enumerate() {
            prompt.push_str(&format!("\n[{}] {}", i + 1, name));
        }
        if allow_none {
            prompt.push_str("\n[leave blank for none]");
        }

        let choice = self.reporter.prompt_choice(&prompt)?;
        Ok(parse_choice(choice.trim(), names))
    }
}

fn parse_choice(choice: &str, names: &[&str]) -> Option<String> {
    if choice.is_empty() {
        return None;
    }
    match choice.parse::<usize>() {
        Ok(index) if (1..=names.len()).contains(&index) => Some(names[index - 1].to_string()),
        _ => Some(choice.to_string()),
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}

#[cfg(test)]
#[path = "negotiate_tests.rs"]
mod tests;
