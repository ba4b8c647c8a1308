use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

mod routes;
mod storage;

use storage::ProjectStore;

#[derive(Clone)]
pub struct AppState {
    pub store: ProjectStore,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tapeline_server=info".into()),
        )
        .init();

    let store = match std::env::var("TAPELINE_DATA_DIR") {
        Ok(dir) => match ProjectStore::with_data_dir(dir.into()).await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to open data directory: {}", e);
                return;
            }
        },
        Err(_) => {
            tracing::warn!("TAPELINE_DATA_DIR not set, projects are kept in memory only");
            ProjectStore::in_memory()
        }
    };

    let state = AppState { store };

    let app = Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/projects",
            get(routes::list_projects).post(routes::create_project),
        )
        .route(
            "/api/projects/{id}/measurements",
            get(routes::get_measurements).put(routes::put_measurements),
        )
        .route("/api/projects/{id}/export", get(routes::export_report))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("TAPELINE_BIND").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    tracing::info!("Server running on http://{}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
