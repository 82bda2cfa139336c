use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregate::Position;
use crate::geodesy::Station;
use crate::report::Report;
use crate::stats::BeamWidthStats;

use super::handlers;

/// What the map page shows: the filtered positions and the beam statistics
/// computed from them.
#[derive(Debug, Clone)]
pub struct MapView {
    pub api_key: String,
    pub station: Station,
    pub positions: Vec<Position>,
    pub beam: Option<BeamWidthStats>,
}

impl MapView {
    pub fn from_report(report: &Report, api_key: String) -> Self {
        Self {
            api_key,
            station: report.station.clone(),
            positions: report.filtered.positions.clone(),
            beam: report.beam.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub view: Arc<MapView>,
}

pub fn router(view: MapView) -> Router {
    let state = AppState {
        view: Arc::new(view),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::map))
        .route("/api/positions", get(handlers::positions))
        .route("/api/beam", get(handlers::beam))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(view: MapView, bind: &str, port: u16) -> std::io::Result<()> {
    let bind_addr = format!("{}:{}", bind, port);
    let app = router(view);

    log::info!("Serving map on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
