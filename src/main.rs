//! kubedump - export every readable Kubernetes resource to a tree of YAML files
//!
//! Connects to the cluster selected by the kubeconfig, discovers every listable resource
//! kind, and writes one YAML file per instance (plus container logs for pods) below the
//! output directory. With `--file-name` the same layout is produced from a manifest file
//! instead, without contacting any cluster.

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cli::ConfigSubcommand;
use kubedump::config::ConfigLoader;
use kubedump::export::{Catalog, ExportOptions, Exporter, export_manifest, prepare_output_root};
use kubedump::kube::{self, KubeCluster};

/// Export every readable Kubernetes resource to a tree of YAML files
#[derive(Parser, Debug)]
#[command(name = "kubedump", version)]
#[command(
    about = "Export every readable Kubernetes resource to a tree of YAML files",
    long_about = None
)]
struct Args {
    /// Output directory; must not exist unless --remove-out-dir is given
    #[arg(short = 'o', long = "out-dir", default_value = "out")]
    out_dir: PathBuf,

    /// Do not print written files or skipped items
    #[arg(short, long)]
    quiet: bool,

    /// Keep the data and stringData of secrets
    #[arg(short = 's', long)]
    dump_secrets: bool,

    /// Keep metadata.managedFields
    #[arg(short = 'm', long)]
    dump_managed_fields: bool,

    /// Delete the output directory before exporting
    #[arg(short = 'r', long = "remove-out-dir")]
    remove_out_dir: bool,

    /// Export the objects of a multi-document YAML file instead of a cluster
    #[arg(short = 'f', long = "file-name", value_name = "FILE")]
    file_name: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long)]
    context: Option<String>,

    /// Kubeconfig file to use instead of the default lookup
    #[arg(long, value_name = "FILE")]
    kubeconfig: Option<PathBuf>,

    /// Resource kinds exported concurrently
    #[arg(short = 'j', long, value_parser = parse_concurrency)]
    concurrency: Option<usize>,

    /// Do not capture container logs of pods
    #[arg(long)]
    no_logs: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn parse_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Installed before config loading, which warns through tracing
    let log_file = cli::init_logging(args.debug)?;
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    if let Some(Command::Config { subcommand }) = args.command {
        return cli::handle_config_command(subcommand, args.config.as_deref());
    }

    let config =
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!("Configuration loaded: {:?}", config);

    let options = ExportOptions {
        output_root: args.out_dir.clone(),
        quiet: args.quiet,
        include_secrets: args.dump_secrets,
        include_managed_fields: args.dump_managed_fields,
        remove_existing_output: args.remove_out_dir,
        capture_logs: config.capture_logs && !args.no_logs,
        concurrency: args.concurrency.unwrap_or(config.concurrency),
        request_timeout: config.request_timeout(),
    };
    let sanitizer = config.name_sanitizer()?;

    // Nothing touches the network before the output root is known to be usable
    prepare_output_root(&options)?;

    let result = match &args.file_name {
        Some(manifest) => export_manifest(manifest, &options, sanitizer).await?,
        None => {
            tracing::debug!("Initializing Kubernetes client");
            let client = kube::create_client(
                args.context.as_deref(),
                args.kubeconfig.as_deref(),
                options.request_timeout,
            )
            .await?;
            if let Some(context) =
                kube::current_context(args.context.as_deref(), args.kubeconfig.as_deref())
            {
                tracing::debug!("Using context {}", context);
            }

            let cluster = KubeCluster::new(client, options.request_timeout);
            let catalog = Catalog::new(config.exclusion_policy())
                .discover(&cluster)
                .await?;

            let exporter = Exporter::new(cluster, options, sanitizer);
            exporter.run_until(&catalog, shutdown_signal()).await
        }
    };

    print!("{}", cli::render_summary(&result, args.quiet));

    if result.cancelled {
        std::process::exit(130);
    }
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
