//! Profile configuration: discovery, loading, validation and persistence of
//! `odev.toml` / `.odev.toml` files.

pub mod paths;
pub mod resolve;
pub mod store;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use paths::{APP_NAME, CONFIG_FILE_NAMES, ConfigContext};
pub use resolve::{
    MergedEntry, MergedProfiles, find_all_config_paths, load_and_merge_profiles,
    resolve_profile_paths,
};
pub use store::ConfigFile;
