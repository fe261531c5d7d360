//! One persisted config document (`odev.toml` / `.odev.toml`).
//!
//! Layout:
//! ```toml
//! [profile.sale]
//! modules = ["sale", "stock"]
//! version = 17.0
//! paths = ["../addons"]
//! ```

use anyhow::{Context, Result};
use odev_core::{ConfigurationError, Profile, Reporter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::validate::decode_profile;

const PROFILE_KEY: &str = "profile";

#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    doc: toml::Table,
    /// Parse error of the on-disk document, if it could not be read as TOML.
    malformed: Option<String>,
}

enum ReadOutcome {
    Absent,
    Parsed(toml::Table),
    Malformed(String),
}

impl ConfigFile {
    /// Load softly: a missing or unreadable file is an empty document, a
    /// malformed one is reported through `reporter` and also yields an empty
    /// document.
    pub fn load(path: &Path, reporter: &dyn Reporter) -> Self {
        let (doc, malformed) = match read_document(path) {
            ReadOutcome::Absent => (toml::Table::new(), None),
            ReadOutcome::Parsed(doc) => (doc, None),
            ReadOutcome::Malformed(message) => {
                reporter.error(&format!(
                    "Invalid TOML configuration in {}: {message}",
                    path.display()
                ));
                (toml::Table::new(), Some(message))
            }
        };
        Self {
            path: path.to_path_buf(),
            doc,
            malformed,
        }
    }

    /// Load for read-modify-write. A malformed document is an error so it is
    /// never overwritten with a blank one.
    pub fn open(path: &Path) -> Result<Self> {
        match read_document(path) {
            ReadOutcome::Absent => Ok(Self::empty(path)),
            ReadOutcome::Parsed(doc) => Ok(Self {
                path: path.to_path_buf(),
                doc,
                malformed: None,
            }),
            ReadOutcome::Malformed(message) => Err(ConfigurationError::MalformedDocument {
                path: path.to_path_buf(),
                message,
            }
            .into()),
        }
    }

    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            doc: toml::Table::new(),
            malformed: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_malformed(&self) -> bool {
        self.malformed.is_some()
    }

    /// Raw `[profile.*]` table, `None` when the document has no profiles.
    pub fn profiles(&self) -> Result<Option<&toml::Table>, ConfigurationError> {
        match self.doc.get(PROFILE_KEY) {
            None => Ok(None),
            Some(toml::Value::Table(profiles)) => Ok(Some(profiles)),
            Some(_) => Err(ConfigurationError::ProfilesNotTable(self.path.clone())),
        }
    }

    pub fn raw_profile(&self, name: &str) -> Result<Option<&toml::Value>, ConfigurationError> {
        Ok(self.profiles()?.and_then(|profiles| profiles.get(name)))
    }

    /// Decoded profile as stored, with paths exactly as written in the file.
    pub fn profile(&self, name: &str) -> Result<Option<Profile>, ConfigurationError> {
        self.raw_profile(name)?
            .map(|value| decode_profile(name, value))
            .transpose()
    }

    /// Upsert `name` and persist the whole document immediately.
    pub fn update(&mut self, name: &str, profile: &Profile) -> Result<()> {
        let value = toml::Value::try_from(profile)
            .with_context(|| format!("Failed to serialize profile '{name}'"))?;

        if !self.doc.contains_key(PROFILE_KEY) {
            self.doc.insert(
                PROFILE_KEY.to_string(),
                toml::Value::Table(toml::Table::new()),
            );
        }
        let Some(profiles) = self
            .doc
            .get_mut(PROFILE_KEY)
            .and_then(toml::Value::as_table_mut)
        else {
            return Err(ConfigurationError::ProfilesNotTable(self.path.clone()).into());
        };
        profiles.insert(name.to_string(), value);

        self.write()
    }

    /// Serialize the complete in-memory document to disk.
    ///
    /// Goes through a sibling temp file and a rename, so readers never see a
    /// partially written document.
    pub fn write(&self) -> Result<()> {
        if let Some(message) = &self.malformed {
            return Err(ConfigurationError::MalformedDocument {
                path: self.path.clone(),
                message: message.clone(),
            }
            .into());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string(&self.doc)
            .with_context(|| format!("Failed to serialize {}", self.path.display()))?;
        let tmp_path = tmp_path_for(&self.path);
        fs::write(&tmp_path, content.as_bytes())
            .with_context(|| format!("writing {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "renaming {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        debug!(path = %self.path.display(), "config file written");
        Ok(())
    }
}

fn read_document(path: &Path) -> ReadOutcome {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "config file not readable, treating as empty");
            return ReadOutcome::Absent;
        }
    };
    match toml::from_str::<toml::Table>(&content) {
        Ok(doc) => ReadOutcome::Parsed(doc),
        Err(e) => ReadOutcome::Malformed(e.to_string().trim_end().to_string()),
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
