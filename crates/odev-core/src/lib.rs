//! Shared types for odev: profiles, error taxonomy and collaborator traits.

pub mod collaborators;
pub mod error;
pub mod profile;
pub mod reporter;

pub use error::{ConfigurationError, UserError};
pub use profile::{Profile, Version, split_modules};
pub use reporter::Reporter;
