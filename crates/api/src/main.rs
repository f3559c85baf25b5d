use anyhow::Context;

use harvestgate_api::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    harvestgate_observability::init();

    let config = ApiConfig::from_env()?;
    let app = harvestgate_api::app::build_app(&config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
