//! Profile record shared by the config store, the negotiator and the runner.
//!
//! Every field is optional so that "not supplied" stays distinguishable from
//! "supplied empty": the same type describes a stored profile, a partial CLI
//! overlay and the resolved configuration handed to the run request builder.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Target application release, e.g. `16.0` or `17.0`.
///
/// Accepts TOML integers and floats alike; always serialized as a float.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Version(f64);

impl Version {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// `None` for NaN and infinities.
    pub fn finite(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Integral part, used for default database names (`v16_sale`).
    pub fn major(self) -> i64 {
        self.0.trunc() as i64
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<f64> for Version {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionVisitor;

        impl Visitor<'_> for VersionVisitor {
            type Value = Version;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str("a numeric version such as 16.0")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Version, E> {
                if !v.is_finite() {
                    return Err(E::custom(format!("version must be finite, got {v}")));
                }
                Ok(Version(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Version, E> {
                Ok(Version(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Version, E> {
                Ok(Version(v as f64))
            }
        }

        deserializer.deserialize_any(VersionVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    /// Addon directories. Absolute once loaded through the resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_install: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_update: Option<bool>,
    /// Opaque arguments appended to the server command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_packages: Option<Vec<String>>,

    // Server options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cron_threads: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_time_cpu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_time_real: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_interface: Option<String>,

    /// Keys this version does not know about; written back untouched.
    #[serde(flatten)]
    pub extra: toml::Table,
}

macro_rules! overlay_fields {
    ($target:expr, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$source.$field {
                $target.$field = Some(value.clone());
            }
        )+
    };
}

impl Profile {
    /// True when no field at all was supplied.
    pub fn is_empty(&self) -> bool {
        self == &Profile::default()
    }

    /// Field-level overlay: fields present in `other` win, absent ones are kept.
    pub fn overlay(&mut self, other: &Profile) {
        overlay_fields!(
            self,
            other,
            modules,
            version,
            python_version,
            db,
            paths,
            enterprise,
            force_install,
            force_update,
            extra_params,
            python_packages,
            db_host,
            db_user,
            db_password,
            load,
            workers,
            max_cron_threads,
            limit_time_cpu,
            limit_time_real,
            http_interface,
        );
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Modules, if present and non-empty.
    pub fn runnable_modules(&self) -> Option<&[String]> {
        self.modules.as_deref().filter(|m| !m.is_empty())
    }

    /// Whether the profile can be handed to a run: non-empty modules and a version.
    pub fn is_runnable(&self) -> bool {
        self.runnable_modules().is_some() && self.version.is_some()
    }
}

/// Split a comma-separated module argument, trimming each entry and
/// dropping blank ones.
pub fn split_modules(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_display_keeps_one_decimal() {
        assert_eq!(Version::new(16.0).to_string(), "16.0");
        assert_eq!(Version::new(17.2).to_string(), "17.2");
        assert_eq!(Version::new(17.0).major(), 17);
    }

    #[test]
    fn test_version_accepts_integer_and_float() {
        let profile: Profile = toml::from_str("version = 16").unwrap();
        assert_eq!(profile.version, Some(Version::new(16.0)));
        let profile: Profile = toml::from_str("version = 17.0").unwrap();
        assert_eq!(profile.version, Some(Version::new(17.0)));
    }

    #[test]
    fn test_version_rejects_non_finite() {
        for src in ["version = nan", "version = inf", "version = -inf"] {
            let result: Result<Profile, _> = toml::from_str(src);
            assert!(result.is_err(), "{src} should be rejected");
        }
        assert_eq!(Version::finite(f64::NAN), None);
        assert_eq!(Version::finite(17.0), Some(Version::new(17.0)));
    }

    #[test]
    fn test_version_rejects_string() {
        let result: Result<Profile, _> = toml::from_str("version = \"16.0\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_overlay_replaces_present_and_keeps_absent() {
        let mut stored = Profile {
            modules: Some(vec!["base".into()]),
            version: Some(Version::new(16.0)),
            db: Some("stored_db".into()),
            python_version: Some("3.10".into()),
            ..Default::default()
        };
        let cli = Profile {
            modules: Some(vec!["sale".into(), "stock".into()]),
            db: Some("cli_db".into()),
            ..Default::default()
        };

        stored.overlay(&cli);

        assert_eq!(
            stored.modules,
            Some(vec!["sale".to_string(), "stock".to_string()])
        );
        assert_eq!(stored.db.as_deref(), Some("cli_db"));
        assert_eq!(stored.version, Some(Version::new(16.0)));
        assert_eq!(stored.python_version.as_deref(), Some("3.10"));
    }

    #[test]
    fn test_overlay_explicit_false_overwrites_true() {
        let mut stored = Profile {
            enterprise: Some(true),
            ..Default::default()
        };
        stored.overlay(&Profile {
            enterprise: Some(false),
            ..Default::default()
        });
        assert_eq!(stored.enterprise, Some(false));
    }

    #[test]
    fn test_is_empty_tracks_presence_not_value() {
        assert!(Profile::default().is_empty());
        let explicit_false = Profile {
            force_install: Some(false),
            ..Default::default()
        };
        assert!(!explicit_false.is_empty());
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let profile: Profile =
            toml::from_str("modules = [\"base\"]\nversion = 16.0\ncustom_flag = \"x\"").unwrap();
        assert_eq!(
            profile.extra.get("custom_flag").and_then(|v| v.as_str()),
            Some("x")
        );
        let rendered = toml::to_string(&profile).unwrap();
        assert!(rendered.contains("custom_flag = \"x\""));
    }

    #[test]
    fn test_is_runnable_requires_modules_and_version() {
        let mut profile = Profile {
            modules: Some(vec![]),
            version: Some(Version::new(16.0)),
            ..Default::default()
        };
        assert!(!profile.is_runnable());
        profile.modules = Some(vec!["base".into()]);
        assert!(profile.is_runnable());
        profile.version = None;
        assert!(!profile.is_runnable());
    }

    #[test]
    fn test_split_modules_trims_entries() {
        assert_eq!(split_modules("base, sale ,stock"), vec!["base", "sale", "stock"]);
        assert_eq!(split_modules("base,,"), vec!["base"]);
        assert!(split_modules(" ").is_empty());
    }
}
