use odev_core::{ConfigurationError, Profile};

/// Structural checks on one raw profile, before typed decoding.
pub fn validate_profile_value(name: &str, value: &toml::Value) -> Result<(), ConfigurationError> {
    let Some(table) = value.as_table() else {
        return Err(ConfigurationError::ProfileNotTable(name.to_string()));
    };

    if let Some(version) = table.get("version") {
        let numeric = match version {
            toml::Value::Integer(_) => true,
            toml::Value::Float(f) => f.is_finite(),
            _ => false,
        };
        if !numeric {
            return Err(ConfigurationError::NonNumericVersion(name.to_string()));
        }
    }

    if let Some(modules) = table.get("modules") {
        let valid = modules.as_array().is_some_and(|items| {
            !items.is_empty()
                && items
                    .iter()
                    .all(|m| m.as_str().is_some_and(|s| !s.trim().is_empty()))
        });
        if !valid {
            return Err(ConfigurationError::InvalidModules(name.to_string()));
        }
    }

    Ok(())
}

/// Validate and decode one raw profile into a typed [`Profile`].
pub fn decode_profile(name: &str, value: &toml::Value) -> Result<Profile, ConfigurationError> {
    validate_profile_value(name, value)?;
    let profile: Profile = value
        .clone()
        .try_into()
        .map_err(|e: toml::de::Error| ConfigurationError::InvalidProfile {
            name: name.to_string(),
            message: e.to_string(),
        })?;
    Ok(profile)
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
