use dropvault_services::{config::Config, records::HttpRecordClient, routes, telemetry};
use dropvault_utils::version_info::{build_commit, build_date, build_version};
use std::net::{IpAddr, SocketAddr};
use tracing::{info, warn};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::init()?;
    telemetry::init_tracing(&config)?;

    print_build_info();
    info!(
        environment = %config.environment(),
        server_addr = %config.server_addr(),
        port = %config.port(),
        "Configuration loaded"
    );

    let client = HttpRecordClient::from_config(&config)?;
    match &client {
        Some(client) => info!(base_url = %client.base_url(), "Record client initialized"),
        None => warn!("Record client not configured; record services will return empty results"),
    }

    let route = routes(client, config.clone());
    let addr = SocketAddr::from((config.server_addr().parse::<IpAddr>()?, config.port()));

    info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, route).await?;

    Ok(())
}

fn print_build_info() {
    info!("===========================================");
    info!("  DropVault Services {}", build_version());
    info!("===========================================");
    info!("Build Date:   {}", build_date());
    info!("Build Commit: {}", build_commit());
    info!("===========================================");
}
