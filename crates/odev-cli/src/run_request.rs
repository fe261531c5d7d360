//! Final, fully defaulted description of one server run.

use odev_core::{Profile, UserError, Version, split_modules};
use std::path::PathBuf;

use crate::cli_params::CliParams;

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_USER: &str = "odoo";
pub const DEFAULT_DB_PASSWORD: &str = "odoo";
pub const DEFAULT_HTTP_INTERFACE: &str = "localhost";
pub const DEFAULT_TIME_LIMIT: u32 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub modules: Vec<String>,
    pub version: Version,
    /// `None` lets the provisioner reuse the newest existing environment.
    pub python_version: Option<String>,
    pub db: String,
    pub paths: Vec<PathBuf>,
    pub enterprise: bool,
    pub force_install: bool,
    pub force_update: bool,
    pub extra_params: Option<String>,
    pub python_packages: Vec<String>,
    pub db_host: String,
    pub db_user: String,
    pub db_password: String,
    pub load: Vec<String>,
    pub workers: u32,
    pub max_cron_threads: u32,
    pub limit_time_cpu: u32,
    pub limit_time_real: u32,
    pub http_interface: String,
}

impl RunRequest {
    /// Build from the negotiated configuration.
    ///
    /// Each field comes from `resolved` first and falls back to the CLI
    /// overlay; blank strings and empty lists count as absent. When neither
    /// carries modules, the raw `--module` argument is split as a last resort.
    pub fn build(resolved: &Profile, cli: &CliParams) -> Result<Self, UserError> {
        let overlay = cli.overlay();

        let modules = pick_list(&resolved.modules, &overlay.modules)
            .or_else(|| {
                cli.module_arg()
                    .map(split_modules)
                    .filter(|m| !m.is_empty())
            })
            .ok_or(UserError::IncompleteConfiguration)?;
        let version = resolved
            .version
            .or(overlay.version)
            .ok_or(UserError::IncompleteConfiguration)?;

        let db = pick_text(&resolved.db, &overlay.db)
            .unwrap_or_else(|| default_db_name(version, &modules));

        Ok(Self {
            python_version: pick_text(&resolved.python_version, &overlay.python_version),
            db,
            paths: pick_list(&resolved.paths, &overlay.paths).unwrap_or_default(),
            enterprise: pick_flag(resolved.enterprise, overlay.enterprise),
            force_install: pick_flag(resolved.force_install, overlay.force_install),
            force_update: pick_flag(resolved.force_update, overlay.force_update),
            extra_params: pick_text(&resolved.extra_params, &overlay.extra_params),
            python_packages: pick_list(&resolved.python_packages, &overlay.python_packages)
                .unwrap_or_default(),
            db_host: pick_text(&resolved.db_host, &overlay.db_host)
                .unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            db_user: pick_text(&resolved.db_user, &overlay.db_user)
                .unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
            db_password: pick_text(&resolved.db_password, &overlay.db_password)
                .unwrap_or_else(|| DEFAULT_DB_PASSWORD.to_string()),
            load: pick_list(&resolved.load, &overlay.load).unwrap_or_default(),
            workers: resolved.workers.or(overlay.workers).unwrap_or(0),
            max_cron_threads: resolved
                .max_cron_threads
                .or(overlay.max_cron_threads)
                .unwrap_or(0),
            limit_time_cpu: resolved
                .limit_time_cpu
                .or(overlay.limit_time_cpu)
                .unwrap_or(DEFAULT_TIME_LIMIT),
            limit_time_real: resolved
                .limit_time_real
                .or(overlay.limit_time_real)
                .unwrap_or(DEFAULT_TIME_LIMIT),
            http_interface: pick_text(&resolved.http_interface, &overlay.http_interface)
                .unwrap_or_else(|| DEFAULT_HTTP_INTERFACE.to_string()),
            modules,
            version,
        })
    }
}

/// `v{major}_{modules joined by "_"}`, e.g. `v17_sale_stock`.
pub fn default_db_name(version: Version, modules: &[String]) -> String {
    format!("v{}_{}", version.major(), modules.join("_"))
}

fn pick_text(first: &Option<String>, second: &Option<String>) -> Option<String> {
    [first, second]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn pick_list<T: Clone>(first: &Option<Vec<T>>, second: &Option<Vec<T>>) -> Option<Vec<T>> {
    [first, second]
        .into_iter()
        .flatten()
        .find(|v| !v.is_empty())
        .cloned()
}

fn pick_flag(first: Option<bool>, second: Option<bool>) -> bool {
    first.or(second).unwrap_or(false)
}
