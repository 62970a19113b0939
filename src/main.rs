use std::path::PathBuf;

use clap::Parser;
use dotenvy::dotenv;
use shelfgraph::{config, server};

/// shelfgraph - JSON gateway for a library ontology served over SPARQL
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file (replaces environment configuration)
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP server host address
    #[arg(long)]
    http_host: Option<String>,

    /// HTTP server port [default: 4000, env: PORT]
    #[arg(long)]
    http_port: Option<u16>,

    /// SPARQL query endpoint [env: FUSEKI_URL]
    #[arg(long)]
    sparql_endpoint: Option<String>,

    /// Timeout for a single SPARQL query, in milliseconds [default: 8000]
    #[arg(long)]
    query_timeout_ms: Option<u64>,

    /// Largest accepted request body, in bytes [default: 65536]
    #[arg(long)]
    max_body_bytes: Option<usize>,
}

impl Cli {
    fn overrides(&self) -> config::CliConfig {
        config::CliConfig {
            http_host: self.http_host.clone(),
            http_port: self.http_port,
            sparql_endpoint: self.sparql_endpoint.clone(),
            query_timeout_ms: self.query_timeout_ms,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    println!("\nshelfgraph v{}\n", env!("CARGO_PKG_VERSION"));

    let base = match &cli.config {
        Some(path) => config::ServerConfig::from_yaml_file(path),
        None => config::ServerConfig::from_env(),
    };

    let config = match base.and_then(|c| c.merge_cli(cli.overrides())) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    server::run_with_config(config).await;
}
