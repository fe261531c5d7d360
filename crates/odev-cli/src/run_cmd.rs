use anyhow::Result;
use odev_config::ConfigContext;
use odev_core::Reporter;
use odev_core::collaborators::{
    EnvironmentProvisioner, Invocation, ProcessLauncher, SourceProvider,
};
use std::collections::HashMap;
use tracing::info;

use crate::cli::RunArgs;
use crate::cli_params::CliParams;
use crate::launch::CommandLauncher;
use crate::manifest::ModuleIndex;
use crate::negotiate::ConfigNegotiator;
use crate::odoo_args::{Action, addons_paths, build_args};
use crate::provision::{GitSourceProvider, UvProvisioner, Workspace};
use crate::run_request::RunRequest;
use crate::wizard::{InteractiveWizard, ProfileWizard};

/// External capabilities a run goes through after negotiation.
pub struct Collaborators<'a> {
    pub sources: &'a dyn SourceProvider,
    pub provisioner: &'a dyn EnvironmentProvisioner,
    pub launcher: &'a dyn ProcessLauncher,
}

pub async fn handle_run(action: Action, args: RunArgs, reporter: &dyn Reporter) -> Result<i32> {
    let ctx = ConfigContext::from_env()?;
    let workspace = Workspace::from_env()?;
    let sources = GitSourceProvider::new(workspace.clone());
    let provisioner = UvProvisioner::new(workspace);
    let collaborators = Collaborators {
        sources: &sources,
        provisioner: &provisioner,
        launcher: &CommandLauncher,
    };
    execute(
        &ctx,
        &action,
        &args,
        reporter,
        &InteractiveWizard,
        &collaborators,
    )
    .await
}

/// Negotiate, build the request, check module availability, prepare the
/// environment, launch.
///
/// Returns the server's exit code.
pub async fn execute(
    ctx: &ConfigContext,
    action: &Action,
    args: &RunArgs,
    reporter: &dyn Reporter,
    wizard: &dyn ProfileWizard,
    collaborators: &Collaborators<'_>,
) -> Result<i32> {
    let cli = CliParams::from_args(args, &ctx.cwd);
    let negotiated =
        ConfigNegotiator::new(ctx, reporter, wizard).negotiate(args.profile.as_deref(), &cli)?;
    let request = RunRequest::build(&negotiated.config, &cli)?;
    info!(
        action = action.label(),
        using = %negotiated.decision.describe(),
        version = %request.version,
        db = %request.db,
        "run request built"
    );

    let checkout = collaborators
        .sources
        .ensure_checkout(request.version, request.enterprise)
        .await?;
    let closure =
        ModuleIndex::scan(&addons_paths(&request, &checkout)).resolve(&request.modules)?;
    let mut packages = request.python_packages.clone();
    for dep in closure.python {
        if !packages.contains(&dep) {
            packages.push(dep);
        }
    }
    info!(
        modules = closure.modules.len(),
        packages = packages.len(),
        "module dependencies resolved"
    );

    let env = collaborators
        .provisioner
        .ensure_ready(
            request.version,
            request.python_version.as_deref(),
            &checkout,
            &packages,
        )
        .await?;
    if request.python_version.is_none() {
        reporter.info(&format!(
            "Found existing environment for Odoo {}, using Python {}.",
            request.version, env.python_version
        ));
    }

    let mut program_args = vec![
        "run".to_string(),
        "--python".to_string(),
        env.python_version.clone(),
        "odoo".to_string(),
    ];
    program_args.extend(build_args(action, &request, &checkout)?);
    let invocation = Invocation {
        program: "uv".to_string(),
        args: program_args,
        env: HashMap::from([(
            "VIRTUAL_ENV".to_string(),
            env.venv_path.to_string_lossy().into_owned(),
        )]),
    };

    reporter.info(&format!(
        "Odoo {} ({}) on database '{}' with modules: {}",
        request.version,
        action.label(),
        request.db,
        request.modules.join(", ")
    ));
    let outcome = collaborators.launcher.launch(&invocation).await?;
    if !outcome.success() {
        reporter.error(&format!("Odoo exited with code {}", outcome.exit_code));
    }
    Ok(outcome.exit_code)
}

#[cfg(test)]
#[path = "run_cmd_tests.rs"]
mod tests;
