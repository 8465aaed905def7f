use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::load_packages;
use crate::logging::init_logging;
use crate::registry::{ConfigurationRegistry, RebuildPolicy, RebuildReport};
use crate::router::ActionMatch;
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for actionroute
///
/// Checks package configuration files and inspects the routing table compiled from them.
#[derive(Parser, Debug)]
#[command(name = "actionroute")]
#[command(about = "Action configuration compiler and router", long_about = None)]
pub struct Cli {
    /// Log level for diagnostics on stderr
    #[arg(long, global = true, default_value = "warn", env = "ACTR_LOG_LEVEL")]
    pub log_level: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a configuration file and report every error
    Check {
        /// Package configuration file (YAML, JSON or TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Treat any error as fatal (all-or-nothing rebuild)
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print the compiled routing table
    Routes {
        /// Package configuration file (YAML, JSON or TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Resolve a request path and print the action that would serve it
    Resolve {
        /// Package configuration file (YAML, JSON or TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Request path, e.g. `/shop/cart.action`
        path: String,
    },
}

/// Parse arguments, initialize logging and run the selected command.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    let runtime = RuntimeConfig::from_env();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &runtime, &mut out)
}

/// Run `command`, writing its report to `out`.
pub fn execute<W: Write>(
    command: &Commands,
    runtime: &RuntimeConfig,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Check { config, strict } => {
            let mut runtime = runtime.clone();
            if *strict {
                runtime.rebuild_policy = RebuildPolicy::AllOrNothing;
            }
            let registry = runtime.registry();
            match build(&registry, config) {
                Ok(report) => {
                    for e in &report.errors {
                        writeln!(out, "error: {e}")?;
                    }
                    writeln!(
                        out,
                        "{}: {} package(s), {} action(s), {} error(s)",
                        config.display(),
                        registry.package_names().len(),
                        report.table.action_count(),
                        report.errors.len()
                    )?;
                    if !report.is_clean() {
                        bail!("{} configuration error(s)", report.errors.len());
                    }
                    Ok(())
                }
                Err(e) => {
                    writeln!(out, "{e:#}")?;
                    Err(e)
                }
            }
        }
        Commands::Routes { config } => {
            let registry = runtime.registry();
            let report = build(&registry, config)?;
            write!(out, "{}", report.table)?;
            for e in &report.errors {
                writeln!(out, "[error] {e}")?;
            }
            Ok(())
        }
        Commands::Resolve { config, path } => {
            let registry = runtime.registry();
            build(&registry, config)?;
            let mapper = runtime.action_mapper();
            let Some(mapping) = mapper.map(path) else {
                bail!("'{path}' is not an action path");
            };
            let Some(found) = registry.resolve(&mapping.namespace, &mapping.name) else {
                bail!(
                    "no action for namespace [{}] and name [{}]",
                    mapping.namespace,
                    mapping.name
                );
            };
            let method = mapping
                .method
                .clone()
                .unwrap_or_else(|| found.action.method_name().to_string());
            print_match(out, &found, &method)?;
            Ok(())
        }
    }
}

fn build(registry: &ConfigurationRegistry, config: &Path) -> anyhow::Result<RebuildReport> {
    let packages = load_packages(config)?;
    registry
        .rebuild(packages)
        .with_context(|| format!("{} failed to compile", config.display()))
}

fn print_match<W: Write>(out: &mut W, found: &ActionMatch, method: &str) -> io::Result<()> {
    let action = &found.action;
    writeln!(out, "package:    {}", action.package_name)?;
    writeln!(
        out,
        "namespace:  {:?} ({:?})",
        found.namespace, found.namespace_source
    )?;
    writeln!(out, "action:     {} ({:?})", action.name, found.action_source)?;
    writeln!(
        out,
        "class:      {}",
        action.class_name.as_deref().unwrap_or("-")
    )?;
    let allowed = if action.is_allowed_method(method) {
        "allowed"
    } else {
        "not allowed"
    };
    writeln!(out, "method:     {method} ({allowed})")?;
    if !action.params.is_empty() {
        writeln!(out, "params:")?;
        for (k, v) in &action.params {
            writeln!(out, "  {k} = {v}")?;
        }
    }
    if !action.interceptors.is_empty() {
        let chain: Vec<&str> = action.interceptors.iter().map(|i| i.name.as_str()).collect();
        writeln!(out, "interceptors: {}", chain.join(" -> "))?;
    }
    for (name, result) in &action.results {
        writeln!(out, "result:     {name} -> {}", result.class_name)?;
    }
    Ok(())
}
