use anyhow::Result;
use server::{AppState, config::Config, routes};
use services::services::{crunchy_api::CrunchyApiClient, notion_api::NotionApiClient};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState {
        crunchy: CrunchyApiClient::new(&config.crunchy_rest_url)?,
        notion: NotionApiClient::new(config.notion_token.clone())?,
        default_notion_database: config.notion_database_id.clone(),
    };

    let app = routes::app(state);
    let listener = TcpListener::bind(config.socket_addr()).await?;
    info!(
        upstream = %config.crunchy_rest_url,
        "crunchy-admin listening on {}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;
    Ok(())
}
