//! Podlet development server.
//!
//! Serves one podlet described by a TOML file on its own, without a layout.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use podlet_warp::{routes, DevConfig};
use tracing::info;

/// Development server arguments.
#[derive(Parser, Debug)]
#[command(name = "podlet-dev")]
#[command(about = "Serve a podlet locally for development")]
struct Args {
    /// Podlet configuration file
    #[arg(short, long, value_name = "PATH", default_value = "podlet.toml")]
    config: PathBuf,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:7100")]
    addr: SocketAddr,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_tracing(json: bool, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("podlet_core=debug,podlet_warp=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_tracing(args.log_json, args.verbose);

    let config = DevConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let podlet = config.build().context("configuring podlet")?;

    info!(
        podlet = podlet.name(),
        version = podlet.version(),
        content = %podlet.content(),
        manifest = %podlet.manifest(),
        addr = %args.addr,
        "starting podlet-dev"
    );

    warp::serve(routes(Arc::new(podlet), config.pages))
        .run(args.addr)
        .await;

    Ok(())
}
