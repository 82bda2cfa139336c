use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::aggregate::Position;
use crate::stats::BeamWidthStats;

use super::server::AppState;
use super::templates::MapTemplate;

pub async fn map(State(state): State<AppState>) -> impl IntoResponse {
    match MapTemplate::new(&state.view) {
        Ok(page) => page.into_response(),
        Err(e) => {
            log::error!("Failed to encode map data: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode map data").into_response()
        }
    }
}

pub async fn positions(State(state): State<AppState>) -> Json<Vec<Position>> {
    Json(state.view.positions.clone())
}

pub async fn beam(State(state): State<AppState>) -> Json<Option<BeamWidthStats>> {
    Json(state.view.beam.clone())
}
