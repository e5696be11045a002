//! railcheck CLI - verify a deployed backend before trusting it
//!
//! Runs a probe suite against the target and exits non-zero if anything
//! failed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use railcheck::client::ReqwestTransport;
use railcheck::config::{Config, TargetOverrides};
use railcheck::probes::{DEFAULT_SUITE, SUITES};
use railcheck::report::{ReportOptions, ReportPrinter};
use railcheck::runner::{AggregateReport, VerificationRunner};

/// railcheck - table-driven HTTP checks for a deployed service
#[derive(Debug, Parser)]
#[command(name = "railcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Line-oriented report
    Text,
    /// Structured JSON summary
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a probe suite against the target
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Suite to run (built-in or defined in the config file)
        #[arg(short, long)]
        suite: Option<String>,

        /// Override the target base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Override the frontend origin used by the CORS probes
        #[arg(long)]
        origin: Option<String>,

        /// Extra header forwarded on every probe ("Name: value")
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Per-request timeout (e.g. 10s, 500ms)
        #[arg(short, long)]
        timeout: Option<String>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Print each response body
        #[arg(long)]
        show_body: bool,
    },

    /// Generate a default configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "railcheck.yaml")]
        output: String,
    },

    /// List available suites
    List {
        /// Also list suites from this configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "railcheck.yaml")]
        config: String,
    },
}

fn setup_logging(verbose: bool, json: bool) {
    // The report owns stdout; logs go to stderr and stay quiet unless asked for
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.json);

    match cli.command {
        Commands::Run {
            config,
            suite,
            base_url,
            origin,
            headers,
            timeout,
            format,
            show_body,
        } => {
            let overrides = TargetOverrides {
                base_url,
                origin,
                headers,
                timeout,
            };
            let report = run_suite(
                config.as_deref(),
                suite.as_deref(),
                overrides,
                format,
                ReportOptions { show_body },
            )
            .await?;

            if !report.all_passed {
                tracing::error!(
                    failed = report.failed_count(),
                    probes = report.results.len(),
                    "Verification failed"
                );
                std::process::exit(report.exit_code());
            }
            Ok(())
        }

        Commands::Init { output } => init_config(&output),

        Commands::List { config } => list_suites(config.as_deref()),

        Commands::Validate { config } => validate_config(&config),
    }
}

/// Load the config file if one was given, otherwise target production
fn load_config(config_path: Option<&str>) -> Result<Config> {
    match config_path {
        Some(path) => {
            tracing::info!(config = %path, "Loading configuration");
            Config::from_file(path).with_context(|| format!("Failed to load config from {path}"))
        }
        None => Ok(Config::default()),
    }
}

/// Run one suite and print its report
///
/// The report is fully written and flushed before this returns.
async fn run_suite(
    config_path: Option<&str>,
    suite: Option<&str>,
    overrides: TargetOverrides,
    format: OutputFormat,
    options: ReportOptions,
) -> Result<AggregateReport> {
    let mut config = load_config(config_path)?;
    config
        .apply_overrides(overrides)
        .context("Invalid command-line override")?;
    config.validate().context("Invalid configuration")?;

    let plan = config.resolve_plan(suite)?;
    let settings = config
        .target
        .to_run_settings()
        .context("Invalid target configuration")?;
    let transport = ReqwestTransport::new().context("Failed to create HTTP client")?;
    let runner = VerificationRunner::new(transport, settings);

    // Misconfiguration must surface before the banner and before any request
    runner
        .plan(&plan.probes)
        .with_context(|| format!("Suite '{}' is misconfigured", plan.name))?;

    tracing::info!(
        suite = %plan.name,
        target = %config.target.base_url,
        probes = plan.probes.len(),
        "Suite loaded"
    );

    let stdout = io::stdout();
    let mut printer = ReportPrinter::new(stdout.lock()).with_options(options);
    let total = plan.probes.len();

    let report = match format {
        OutputFormat::Text => {
            printer.banner(&plan, &config.target)?;
            let mut print_error = None;
            let report = runner
                .run_with(&plan.probes, |index, result| {
                    if let Err(e) = printer.probe(index, total, result) {
                        print_error.get_or_insert(e);
                    }
                })
                .await?;
            if let Some(e) = print_error {
                return Err(e).context("Failed to write report");
            }
            printer.summary(&report, &plan)?;
            report
        }
        OutputFormat::Json => {
            let report = runner.run(&plan.probes).await?;
            printer.json_summary(&report)?;
            report
        }
    };
    printer.into_inner().flush()?;

    Ok(report)
}

/// Generate a default configuration file
fn init_config(output: &str) -> Result<()> {
    let config = Config::default_config();
    let yaml = config.to_yaml().context("Failed to serialize config")?;

    std::fs::write(output, &yaml).with_context(|| format!("Failed to write config to {output}"))?;

    tracing::info!(path = %output, "Configuration file created");
    println!("Created {output}");
    println!();
    println!("Edit the file to point at your service, then run:");
    println!("  railcheck run --config {output}");

    Ok(())
}

/// List available suites
fn list_suites(config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("Built-in suites:");
    println!();
    for (name, suite) in SUITES.iter() {
        let marker = if *name == DEFAULT_SUITE { " (default)" } else { "" };
        println!("  {name:20} - {}{marker}", suite.description());
    }

    if !config.suites.is_empty() {
        println!();
        println!("Configured suites:");
        println!();
        for (name, suite) in &config.suites {
            println!("  {name:20} - {} ({} probes)", suite.description, suite.probes.len());
        }
    }

    println!();
    println!("Run a specific suite with:");
    println!("  railcheck run --suite deployment");

    Ok(())
}

/// Validate a configuration file
fn validate_config(config_path: &str) -> Result<()> {
    tracing::info!(config = %config_path, "Validating configuration");

    let config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load config from {config_path}"))?;
    config.validate().context("Invalid configuration")?;

    println!("Configuration is valid!");
    println!();
    println!("Target: {}", config.target.base_url);
    println!("Origin: {}", config.target.origin);
    println!("Timeout: {}", humantime::format_duration(config.target.timeout));
    if let Some(default_suite) = &config.default_suite {
        println!("Default suite: {default_suite}");
    }

    println!();
    println!("Suites configured: {}", config.suites.len());
    for (name, suite) in &config.suites {
        println!("  - {name}: {} probes", suite.probes.len());
    }

    Ok(())
}
