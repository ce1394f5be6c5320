use anyhow::Context;

use chariot_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chariot_observability::init();

    let cfg = AppConfig::load().context("failed to load configuration")?;
    let services = chariot_api::app::build_services(&cfg).await?;
    let app = chariot_api::app::build_app(services);

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
