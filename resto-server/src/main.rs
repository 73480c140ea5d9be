use resto_server::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = setup_environment()?;
    print_banner();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.database_url,
        "Restaurant server starting"
    );

    let state = ServerState::initialize(&config).await?;
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
