//! Binary entrypoint for the config server.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use config_server::AppState;
use rate_alert::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let port: u16 = std::env::var("PORT")
    .unwrap_or_else(|_| "5005".into())
    .parse()?;

  let settings = match std::env::var("RATE_ALERT_SETTINGS") {
    Ok(path) => Settings::load(Path::new(&path))?,
    Err(_) => Settings::stub(),
  };
  let state = Arc::new(AppState::new(settings.policy_table()));
  let app = config_server::router(state);

  let addr = SocketAddr::from(([127, 0, 0, 1], port));
  info!("config-server listening on http://{}", addr);

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
