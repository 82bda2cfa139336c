use serde::Serialize;

/// The fixed receiving location every distance and bearing is measured from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub name: Option<String>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl Station {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            name: None,
            latitude_deg,
            longitude_deg,
        }
    }

    /// Parses `"lat,lon"`. Returns `None` for anything that isn't two numbers
    /// forming a valid position.
    pub fn from_coordinates(coordinates: &str, name: Option<String>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !super::is_valid_position(lat, lon) {
            return None;
        }
        Some(Self {
            name,
            ..Self::new(lat, lon)
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_pair() {
        let station = Station::from_coordinates(" 52.5, 4.25 ", None).unwrap();
        assert_eq!(station.latitude_deg, 52.5);
        assert_eq!(station.longitude_deg, 4.25);
        assert!(station.name.is_none());
    }

    #[test]
    fn rejects_malformed_coordinates() {
        assert!(Station::from_coordinates("52.5", None).is_none());
        assert!(Station::from_coordinates("52.5,4.2,1", None).is_none());
        assert!(Station::from_coordinates("north,east", None).is_none());
        assert!(Station::from_coordinates("95.0,4.2", None).is_none());
    }
}
