mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let projector = price_projector::AsyncPriceProjector::builder()
        .build()
        .await
        .expect("Failed to initialize price projector");

    let state = Arc::new(AppState { projector });

    let app = Router::new()
        .route(
            "/market-data/{asset}/historical",
            get(routes::market_data::historical),
        )
        .route(
            "/market-data/{asset}/projected",
            get(routes::market_data::projected),
        )
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = "0.0.0.0:8080";
    info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
