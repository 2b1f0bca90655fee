mod config;
mod reactor;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use clap::Parser;
use config::{Cli, Config};
use lobos_http::{GatewayService, GatewayState};
use lobos_index::KeyIndex;

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e.message);
            std::process::exit(e.exit_code);
        }
    };

    init_tracing();

    tracing::info!(
        dir = %config.dir.display(),
        bucket = %config.bucket_name,
        port = config.port,
        threads = config.threads,
        pin_threads = config.pin_threads,
        index_enabled = config.index_enabled,
        index_refresh_sec = config.index_refresh_sec,
        "starting lobos",
    );

    if let Err(e) = std::env::set_current_dir(&config.dir) {
        eprintln!("Error: {e}");
        std::process::exit(e.raw_os_error().unwrap_or(libc::EINVAL));
    }

    let index = if config.index_enabled {
        let start = std::time::Instant::now();
        tracing::info!("recursively building index... this can take a while");
        match KeyIndex::build_from_fs(std::path::Path::new(".")) {
            Ok(index) => {
                tracing::info!(elapsed = ?start.elapsed(), items = index.len(), "index built");
                Some(Arc::new(index))
            }
            Err(e) => {
                eprintln!("Error building index: {e}");
                std::process::exit(e.raw_os_error().unwrap_or(libc::EIO));
            }
        }
    } else {
        None
    };

    let state = Arc::new(GatewayState { bucket_name: config.bucket_name.clone(), index });
    let service = GatewayService::new(state);

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), config.port);
    reactor::run(addr, config.threads, config.pin_threads, service);
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
