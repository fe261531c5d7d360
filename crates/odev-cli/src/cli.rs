use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "odev")]
#[command(about = "odev: run local Odoo development instances from declarative profiles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an Odoo server
    Start {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Update modules and exit
    Upgrade {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Install, update and run module tests, then exit
    Test {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Open an Odoo shell
    Shell {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Export a translation file for the selected modules
    Translate {
        /// Language code, e.g. fr_FR
        #[arg(short, long)]
        language: String,

        /// Output .po file (defaults to <language>.po in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List profiles from every config file
    Profiles,
}

/// Profile selector plus value overrides. An override that is not passed is
/// absent, which is different from passing an empty or false value.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Profile name to run or update
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Odoo module name(s), comma-separated
    #[arg(short, long)]
    pub module: Option<String>,

    /// Odoo version, e.g. 17.0
    #[arg(short, long, value_parser = parse_version)]
    pub version: Option<f64>,

    /// Python version for the virtual environment
    #[arg(short = 'P', long = "python")]
    pub python_version: Option<String>,

    /// Database name
    #[arg(short, long)]
    pub db: Option<String>,

    /// Extra addons directory (repeatable)
    #[arg(long = "path")]
    pub paths: Vec<PathBuf>,

    /// Include the enterprise addons
    #[arg(long)]
    pub enterprise: bool,

    /// Install the modules on start (-i)
    #[arg(long)]
    pub force_install: bool,

    /// Update the modules on start (-u)
    #[arg(long)]
    pub force_update: bool,

    /// Extra arguments passed verbatim to Odoo
    #[arg(long, allow_hyphen_values = true)]
    pub extra_params: Option<String>,
}

fn parse_version(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if !value.is_finite() {
        return Err(format!("'{raw}' is not a finite number"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_accepts_decimal_release() {
        let cli = Cli::try_parse_from(["odev", "start", "-v", "17.0"]).unwrap();
        let Commands::Start { run } = cli.command else {
            panic!("expected start");
        };
        assert_eq!(run.version, Some(17.0));
    }

    #[test]
    fn version_rejects_non_finite_values() {
        for raw in ["nan", "inf", "-inf", "seventeen"] {
            assert!(
                Cli::try_parse_from(["odev", "start", "--version", raw]).is_err(),
                "{raw} should be rejected"
            );
        }
    }
}
