use askama::Template;
use askama_web::WebTemplate;

use super::server::MapView;

#[derive(Template, WebTemplate)]
#[template(path = "map.html")]
pub struct MapTemplate {
    pub api_key: String,
    pub title: String,
    pub station_lat: f64,
    pub station_lon: f64,
    pub sample_count: usize,
    /// Serialized positions, inlined into the page script.
    pub positions_json: String,
    pub beam_json: String,
}

impl MapTemplate {
    pub fn new(view: &MapView) -> serde_json::Result<Self> {
        Ok(Self {
            api_key: view.api_key.clone(),
            title: view
                .station
                .name
                .clone()
                .unwrap_or_else(|| "AIS reception".to_string()),
            station_lat: view.station.latitude_deg,
            station_lon: view.station.longitude_deg,
            sample_count: view.positions.len(),
            positions_json: serde_json::to_string(&view.positions)?,
            beam_json: serde_json::to_string(&view.beam)?,
        })
    }
}
