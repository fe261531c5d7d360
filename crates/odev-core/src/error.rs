use std::path::PathBuf;

/// Defects in user-authored configuration data. Never retried.
#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("Invalid TOML configuration in {path}: {message}")]
    MalformedDocument { path: PathBuf, message: String },

    #[error("Profiles in {0} must be a table")]
    ProfilesNotTable(PathBuf),

    #[error("Profile '{0}' must be a table")]
    ProfileNotTable(String),

    #[error("Version in profile '{0}' must be a number")]
    NonNumericVersion(String),

    #[error("Modules in profile '{0}' must be a non-empty list of non-empty names")]
    InvalidModules(String),

    #[error("Profile '{name}' is invalid: {message}")]
    InvalidProfile { name: String, message: String },
}

/// Expected, actionable conditions that abort the current command.
#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("Profile '{0}' not found.")]
    ProfileNotFound(String),

    #[error(
        "Module and version arguments are required when running without a profile or existing configuration."
    )]
    MissingRequiredParams,

    #[error("No Odoo modules/version specified to run Odoo")]
    IncompleteConfiguration,

    #[error("No profile selected")]
    NoSelection,

    #[error("Aborted: {0}")]
    Aborted(String),

    #[error("Python version is required for Odoo {0}. Pass it with --python.")]
    PythonVersionRequired(String),

    #[error("Command `{command}` failed with exit code {exit_code}")]
    CommandFailed { command: String, exit_code: i32 },

    #[error("{}", missing_modules_message(requested, transitive))]
    MissingModules {
        requested: Vec<String>,
        transitive: Vec<String>,
    },
}

fn missing_modules_message(requested: &[String], transitive: &[String]) -> String {
    let mut parts = Vec::new();
    if !requested.is_empty() {
        parts.push(format!(
            "The following modules requested by you were not found: {}.",
            requested.join(", ")
        ));
    }
    if !transitive.is_empty() {
        parts.push(format!(
            "The following transitive dependencies were not found: {}.",
            transitive.join(", ")
        ));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_non_numeric_version() {
        let err = ConfigurationError::NonNumericVersion("dev".into());
        assert_eq!(err.to_string(), "Version in profile 'dev' must be a number");
    }

    #[test]
    fn test_display_malformed_document_includes_path() {
        let err = ConfigurationError::MalformedDocument {
            path: PathBuf::from("/tmp/odev.toml"),
            message: "expected `=`".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid TOML configuration in /tmp/odev.toml: expected `=`"
        );
    }

    #[test]
    fn test_display_profile_not_found() {
        let err = UserError::ProfileNotFound("sale".into());
        assert_eq!(err.to_string(), "Profile 'sale' not found.");
    }

    #[test]
    fn test_display_command_failed() {
        let err = UserError::CommandFailed {
            command: "git fetch".into(),
            exit_code: 128,
        };
        assert_eq!(
            err.to_string(),
            "Command `git fetch` failed with exit code 128"
        );
    }

    #[test]
    fn test_display_missing_modules_lists_both_groups() {
        let err = UserError::MissingModules {
            requested: vec!["ghost".into(), "spook".into()],
            transitive: vec!["phantom".into()],
        };
        assert_eq!(
            err.to_string(),
            "The following modules requested by you were not found: ghost, spook. \
             The following transitive dependencies were not found: phantom."
        );

        let only_transitive = UserError::MissingModules {
            requested: vec![],
            transitive: vec!["phantom".into()],
        };
        assert_eq!(
            only_transitive.to_string(),
            "The following transitive dependencies were not found: phantom."
        );
    }

    #[test]
    fn test_errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<ConfigurationError>();
        assert_send_sync::<UserError>();
    }
}
