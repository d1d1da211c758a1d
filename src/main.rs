mod cli;

use clipdock::{
    catalog::{Catalog, JsonFileStore},
    config::{self, Config},
    jobs::{tools, JobSupervisor},
    server::{self, AppContext},
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

fn open_catalog(config: &Config) -> Result<Catalog> {
    let media_dir = config.storage.resolved_media_dir();
    std::fs::create_dir_all(&media_dir)
        .with_context(|| format!("Failed to create media directory {:?}", media_dir))?;

    let catalog_file = config.storage.resolved_catalog_file();
    tracing::info!("Using catalog {:?}, media in {:?}", catalog_file, media_dir);

    let catalog = Catalog::open(media_dir, Box::new(JsonFileStore::new(catalog_file)))
        .context("Failed to open catalog")?;
    Ok(catalog)
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Clipdock server");

    let catalog = Arc::new(open_catalog(&config)?);
    let pruned = catalog.reconcile();
    if !pruned.removed.is_empty() {
        tracing::info!("Pruned {} records with missing files", pruned.removed.len());
    }

    let supervisor = JobSupervisor::new(catalog.clone(), config.publisher.clone());
    let ctx = AppContext::new(config, catalog, supervisor);

    server::start_server(ctx).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipdock=trace,clipdock_common=debug,tower_http=debug".to_string()
        } else {
            "clipdock=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Prune => prune(cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Version => {
            println!("clipdock {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            print_config(&config);
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Media dir: {}", config.storage.resolved_media_dir().display());
    println!("  Catalog: {}", config.storage.resolved_catalog_file().display());
    match config.publisher.script_path() {
        Some(script) => println!(
            "  Publisher: {} {}",
            config.publisher.program,
            script.display()
        ),
        None => println!("  Publisher: {}", config.publisher.program),
    }
    println!("  Default privacy: {}", config.publisher.default_privacy);
}

fn prune(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let catalog = open_catalog(&config)?;

    let result = catalog.reconcile();
    for record in &result.removed {
        println!("✗ {} ({}) - {}", record.id, record.title, record.filename);
    }
    println!(
        "Kept {} records, removed {}",
        result.kept.len(),
        result.removed.len()
    );

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = tools::check_publisher(&config.publisher);
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("Publisher is ready!");
    } else {
        println!("The publisher is incomplete. Upload jobs will fail until it is installed.");
    }

    Ok(())
}
