use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eduai::{config::AppConfig, handlers, services::WebhookGenerator, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eduai=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = AppConfig::load().expect("Failed to load configuration");

  let generator =
    WebhookGenerator::new(&config.generation).expect("Failed to build generation client");
  let state = AppState::new(Arc::new(generator));

  let app = handlers::router(state).layer(TraceLayer::new_for_http());

  let bind_addr = config.server.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config.server.port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
