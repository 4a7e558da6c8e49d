//! Salt sandbox builder.
//!
//! Reads the provisioner section of a test manifest and assembles the
//! masterless salt tree (minion config, pillars, grains, formulas, top file)
//! under a local sandbox directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use saltbox::SandboxError;
use saltbox::build::{BuildContext, BuildSummary, build_sandbox};
use saltbox::config::SaltConfig;
use saltbox::core::effective::EffectiveConfig;
use saltbox::core::minion::render_minion_config;
use saltbox::events::TracingSink;
use saltbox::exit_codes;
use saltbox::io::config::load_config;
use saltbox::logging;

#[derive(Parser)]
#[command(name = "saltbox", version, about = "Assemble a masterless salt sandbox")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the sandbox tree.
    Build {
        #[command(flatten)]
        manifest: ManifestArgs,
        /// Sandbox root to populate (created if missing).
        #[arg(long)]
        sandbox: PathBuf,
    },
    /// Print the effective configuration as YAML.
    Config {
        #[command(flatten)]
        manifest: ManifestArgs,
    },
    /// Print the rendered minion config.
    Minion {
        #[command(flatten)]
        manifest: ManifestArgs,
    },
}

#[derive(Args)]
struct ManifestArgs {
    /// Manifest file (a bare provisioner mapping or a kitchen document).
    #[arg(long, short)]
    manifest: PathBuf,
    /// Apply this suite's provisioner overrides.
    #[arg(long)]
    suite: Option<String>,
    /// Directory relative local paths resolve against. Defaults to the
    /// manifest's directory.
    #[arg(long)]
    project_root: Option<PathBuf>,
}

impl ManifestArgs {
    fn load(&self) -> Result<SaltConfig> {
        let config = load_config(&self.manifest, self.suite.as_deref())
            .with_context(|| format!("load manifest {}", self.manifest.display()))?;
        Ok(config)
    }

    fn working_dir(&self) -> PathBuf {
        self.project_root
            .clone()
            .unwrap_or_else(|| manifest_dir(&self.manifest))
    }
}

fn main() {
    logging::init();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("{:#}", err);
        let code = err
            .downcast_ref::<SandboxError>()
            .map_or(exit_codes::FAILED, exit_codes::for_error);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build { manifest, sandbox } => cmd_build(&manifest, sandbox),
        Command::Config { manifest } => cmd_config(&manifest),
        Command::Minion { manifest } => cmd_minion(&manifest),
    }
}

fn cmd_build(args: &ManifestArgs, sandbox: PathBuf) -> Result<()> {
    let config = args.load()?;
    let ctx = BuildContext::new(sandbox, args.working_dir());
    let summary = build_sandbox(&config, &ctx, &TracingSink)
        .with_context(|| format!("build sandbox {}", ctx.sandbox.path().display()))?;
    println!("{}", summary_line(ctx.sandbox.path(), &summary));
    Ok(())
}

fn cmd_config(args: &ManifestArgs) -> Result<()> {
    let config = args.load()?;
    let effective = EffectiveConfig::derive(&config, &args.working_dir())?;
    let rendered = serde_yaml::to_string(&effective).context("serialize effective config")?;
    print!("{rendered}");
    Ok(())
}

fn cmd_minion(args: &ManifestArgs) -> Result<()> {
    let config = args.load()?;
    let effective = EffectiveConfig::derive(&config, &args.working_dir())?;
    let minion = &effective.minion;
    print!(
        "{}",
        render_minion_config(&minion.environment, &minion.file_root, &minion.pillar_root)
    );
    Ok(())
}

fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn summary_line(sandbox: &Path, summary: &BuildSummary) -> String {
    let formulas = format!("formulas [{}]", summary.formulas.join(", "));
    let file_root = match (summary.collection, summary.formulas.is_empty()) {
        (true, true) => "state collection".to_string(),
        (true, false) => format!("state collection, {formulas}"),
        (false, _) => formulas,
    };
    format!(
        "built {}: {file_root}, {} pillar file(s)",
        sandbox.display(),
        summary.pillar_files
    )
}
