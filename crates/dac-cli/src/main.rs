mod cmd;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dac_core::config::{CustomerConfig, Settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dac",
    about = "Detections as code — manage Elastic Security rule enablement from Git",
    version,
    propagate_version = true
)]
struct Cli {
    /// Customer config YAML whose Kibana URL/space overrides apply to this run
    #[arg(long, global = true, value_name = "PATH")]
    customer_config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an enablement manifest
    Validate {
        /// Path to the manifest file
        manifest: PathBuf,
    },

    /// Show the actions needed to converge the remote to the manifest
    Diff {
        #[arg(long, default_value = "enablement.yaml")]
        manifest: PathBuf,
    },

    /// Reconcile remote rule enablement to match the manifest
    Push {
        #[arg(long, default_value = "enablement.yaml")]
        manifest: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Export current remote enablement state to a manifest file
    Pull {
        #[arg(long, default_value = "enablement.yaml")]
        out: PathBuf,
    },

    /// Export a single rule from the remote as YAML to stdout
    ExportRule { rule_id: String },

    /// Write the manifest into a target rules repository and commit it
    Sync {
        #[arg(long, default_value = "enablement.yaml")]
        manifest: PathBuf,

        /// Path to the target rules repository (working tree)
        #[arg(long)]
        repo: PathBuf,

        /// Commit message
        #[arg(long, default_value = "chore: update rule enablement")]
        message: String,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        customer_config,
        json,
        command,
    } = cli;

    let settings = || -> anyhow::Result<Settings> {
        let mut settings =
            Settings::from_env().context("failed to load settings from environment")?;
        if let Some(path) = &customer_config {
            let customer = CustomerConfig::load(path)
                .with_context(|| format!("failed to load customer config {}", path.display()))?;
            settings = settings.with_customer(&customer);
        }
        Ok(settings)
    };

    match command {
        Commands::Validate { manifest } => cmd::validate::run(&manifest, json),
        Commands::Diff { manifest } => cmd::diff::run(&settings()?, &manifest, json),
        Commands::Push { manifest, dry_run } => {
            cmd::push::run(&settings()?, &manifest, dry_run, json)
        }
        Commands::Pull { out } => cmd::pull::run(&settings()?, &out, json),
        Commands::ExportRule { rule_id } => cmd::export_rule::run(&settings()?, &rule_id),
        Commands::Sync {
            manifest,
            repo,
            message,
        } => cmd::sync::run(&manifest, &repo, &message, json),
    }
}
