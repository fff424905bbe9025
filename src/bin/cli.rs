//! Butterfly CLI - caller/callee graphs from the command line.

use butterfly::cli::{self, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Logs go to stderr so JSON and DOT output on stdout stay pipeable.
    let default_filter = match args.verbose {
        0 => "butterfly=info",
        1 => "butterfly=debug",
        _ => "butterfly=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
