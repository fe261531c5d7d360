//! Server command lines for each action.
//!
//! Every builder emits the arguments that follow the `odoo` executable.
//! Words from `extra_params` always come last; a managed `--flag` the user
//! already set there is not emitted a second time.

use anyhow::{Context, Result};
use odev_core::collaborators::SourceCheckout;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::run_request::RunRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Run,
    Upgrade,
    Test,
    Shell,
    Translate { language: String, output: PathBuf },
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Run => "start",
            Action::Upgrade => "upgrade",
            Action::Test => "test",
            Action::Shell => "shell",
            Action::Translate { .. } => "translate",
        }
    }
}

/// Addon search path: core addons that exist on disk, the enterprise
/// checkout, then the profile's own directories.
pub fn addons_paths(request: &RunRequest, checkout: &SourceCheckout) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = [
        checkout.odoo.join("addons"),
        checkout.odoo.join("odoo").join("addons"),
    ]
    .into_iter()
    .filter(|p| p.is_dir())
    .collect();
    if request.enterprise {
        paths.extend(checkout.enterprise.iter().cloned());
    }
    paths.extend(request.paths.iter().cloned());
    paths
}

pub fn build_args(
    action: &Action,
    request: &RunRequest,
    checkout: &SourceCheckout,
) -> Result<Vec<String>> {
    let extra = match &request.extra_params {
        Some(raw) => shell_words::split(raw)
            .with_context(|| format!("Failed to parse extra parameters: {raw}"))?,
        None => Vec::new(),
    };
    let mut args = ArgList::new(&extra);
    let modules = request.modules.join(",");

    match action {
        Action::Run => {
            args.common(request, checkout);
            if request.force_install {
                args.push_pair("-i", &modules);
            }
            if request.force_update {
                args.push_pair("-u", &modules);
            }
            if !request.load.is_empty() {
                args.push_pair("--load", &request.load.join(","));
            }
            args.managed_number("--workers", request.workers);
            args.managed_number("--max-cron-threads", request.max_cron_threads);
            args.managed_number("--limit-time-cpu", request.limit_time_cpu);
            args.managed_number("--limit-time-real", request.limit_time_real);
            args.managed("--http-interface", &request.http_interface);
        }
        Action::Upgrade => {
            args.common(request, checkout);
            args.push("--stop-after-init");
            args.push_pair("-u", &modules);
        }
        Action::Test => {
            args.common(request, checkout);
            args.push("--test-enable");
            args.push("--stop-after-init");
            args.push_pair("-i", &modules);
            args.push_pair("-u", &modules);
        }
        Action::Shell => {
            args.push("shell");
            args.common(request, checkout);
            args.push("--no-http");
        }
        Action::Translate { language, output } => {
            args.push_pair("-d", &request.db);
            args.db_options(request);
            args.push("--stop-after-init");
            args.push_pair("--modules", &modules);
            args.push_pair("--i18n-export", &output.to_string_lossy());
            args.push_pair("--language", language);
        }
    }

    Ok(args.finish(extra))
}

struct ArgList {
    args: Vec<String>,
    user_flags: HashSet<String>,
}

impl ArgList {
    fn new(extra: &[String]) -> Self {
        let user_flags = extra
            .iter()
            .filter(|word| word.starts_with("--"))
            .filter_map(|word| word.split('=').next())
            .map(str::to_string)
            .collect();
        Self {
            args: Vec::new(),
            user_flags,
        }
    }

    fn push(&mut self, arg: &str) {
        self.args.push(arg.to_string());
    }

    fn push_pair(&mut self, flag: &str, value: &str) {
        self.push(flag);
        self.push(value);
    }

    /// Skipped when blank or already supplied by the user.
    fn managed(&mut self, flag: &str, value: &str) {
        if !value.is_empty() && !self.user_flags.contains(flag) {
            self.push_pair(flag, value);
        }
    }

    /// Zero means "server default" and is not emitted.
    fn managed_number(&mut self, flag: &str, value: u32) {
        if value != 0 {
            self.managed(flag, &value.to_string());
        }
    }

    fn common(&mut self, request: &RunRequest, checkout: &SourceCheckout) {
        self.push_pair("-d", &request.db);
        let addons = addons_paths(request, checkout)
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(",");
        self.push_pair("--addons-path", &addons);
        self.db_options(request);
    }

    fn db_options(&mut self, request: &RunRequest) {
        self.managed("--db_host", &request.db_host);
        self.managed("--db_user", &request.db_user);
        self.managed("--db_password", &request.db_password);
    }

    fn finish(mut self, extra: Vec<String>) -> Vec<String> {
        self.args.extend(extra);
        self.args
    }
}
