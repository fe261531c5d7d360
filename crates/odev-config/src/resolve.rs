//! Discovery and precedence merge of profiles across config files.

use anyhow::Result;
use odev_core::{Profile, Reporter};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::paths::{ConfigContext, resolve_against};
use crate::store::ConfigFile;
use crate::validate::decode_profile;

/// A merged profile together with the file that defined it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedEntry {
    pub name: String,
    pub profile: Profile,
    pub source: PathBuf,
}

/// Profiles from every config file, keyed by name.
///
/// Iterates in first-insertion order across the fold; a higher-precedence
/// file replaces a same-named profile in place. Every entry carries its
/// originating file so write-back can target it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedProfiles {
    entries: Vec<MergedEntry>,
}

impl MergedProfiles {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MergedEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn entry(&self, name: &str) -> Option<&MergedEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.entry(name).map(|e| &e.profile)
    }

    pub fn source(&self, name: &str) -> Option<&Path> {
        self.entry(name).map(|e| e.source.as_path())
    }

    /// Entries whose originating file sits directly in `dir`.
    pub fn defined_in(&self, dir: &Path) -> Vec<&MergedEntry> {
        self.entries
            .iter()
            .filter(|e| {
                e.source
                    .parent()
                    .is_some_and(|parent| parent.as_os_str() == dir.as_os_str())
            })
            .collect()
    }
}

/// Existing config files, highest precedence first:
/// cwd hidden, cwd named, user hidden, user named.
pub fn find_all_config_paths(ctx: &ConfigContext) -> Vec<PathBuf> {
    ctx.candidate_paths()
        .into_iter()
        .filter(|path| path.is_file())
        .collect()
}

/// Fold every config file (lowest precedence first) into one profile set,
/// then validate the whole set.
///
/// Unreadable or malformed files contribute nothing. Any invalid profile in
/// the merged set fails the call, even one that is not going to be run.
pub fn load_and_merge_profiles(
    ctx: &ConfigContext,
    reporter: &dyn Reporter,
) -> Result<MergedProfiles> {
    let mut raw: Vec<(String, toml::Value, PathBuf)> = Vec::new();

    for path in find_all_config_paths(ctx).into_iter().rev() {
        let file = ConfigFile::load(&path, reporter);
        let Some(profiles) = file.profiles()? else {
            debug!(path = %path.display(), "no profiles in config file");
            continue;
        };
        let base = path.parent().unwrap_or(Path::new(""));

        for (name, value) in profiles {
            let mut value = value.clone();
            resolve_raw_paths(&mut value, base);
            match raw.iter_mut().find(|(existing, _, _)| existing == name) {
                Some(slot) => {
                    debug!(profile = %name, from = %slot.2.display(), to = %path.display(), "profile overridden");
                    slot.1 = value;
                    slot.2 = path.clone();
                }
                None => raw.push((name.clone(), value, path.clone())),
            }
        }
    }

    let mut entries = Vec::with_capacity(raw.len());
    for (name, value, source) in raw {
        let profile = decode_profile(&name, &value)?;
        entries.push(MergedEntry {
            name,
            profile,
            source,
        });
    }
    debug!(count = entries.len(), "profiles merged");
    Ok(MergedProfiles { entries })
}

/// Resolve `paths` entries of a raw profile against `base`. Non-string
/// entries are left for validation to reject.
pub fn resolve_raw_paths(value: &mut toml::Value, base: &Path) {
    let Some(paths) = value
        .as_table_mut()
        .and_then(|t| t.get_mut("paths"))
        .and_then(toml::Value::as_array_mut)
    else {
        return;
    };
    for entry in paths.iter_mut() {
        if let Some(raw_path) = entry.as_str() {
            let resolved = resolve_against(Path::new(raw_path), base);
            *entry = toml::Value::String(resolved.to_string_lossy().into_owned());
        }
    }
}

/// Typed counterpart of [`resolve_raw_paths`].
pub fn resolve_profile_paths(profile: &mut Profile, base: &Path) {
    if let Some(paths) = profile.paths.as_mut() {
        for path in paths.iter_mut() {
            *path = resolve_against(path, base);
        }
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
