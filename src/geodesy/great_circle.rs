use super::Station;

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_NAUTICAL_MILE: f64 = 1.852;

pub fn is_valid_position(lat: f64, lon: f64) -> bool {
    lat.abs() <= 90.0 && lon.abs() <= 180.0
}

/// Haversine distance from the station to `(lat, lon)` in nautical miles.
pub fn distance_nm(station: &Station, lat: f64, lon: f64) -> f64 {
    let lat1 = station.lat_rad();
    let lat2 = lat.to_radians();
    let dlat = (lat - station.latitude_deg).to_radians();
    let dlon = (lon - station.longitude_deg).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push `a` just past 1 near the antipode
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c / KM_PER_NAUTICAL_MILE
}

/// Initial great-circle bearing from the station to `(lat, lon)`, in `[0, 360)`.
/// A point on top of the station has no direction and reports 0.
pub fn bearing_deg(station: &Station, lat: f64, lon: f64) -> f64 {
    if lat == station.latitude_deg && lon == station.longitude_deg {
        return 0.0;
    }

    let lat1 = station.lat_rad();
    let lat2 = lat.to_radians();
    let dlon = (lon - station.longitude_deg).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_deg(y.atan2(x).to_degrees())
}

/// Wraps any angle into `[0, 360)`.
pub(crate) fn normalize_deg(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn station(lat: f64, lon: f64) -> Station {
        Station::new(lat, lon)
    }

    #[test]
    fn distance_to_self_is_zero() {
        let s = station(51.9, 4.4);
        assert_eq!(distance_nm(&s, 51.9, 4.4), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = station(51.9, 4.4);
        let b = station(53.2, 2.1);
        let ab = distance_nm(&a, b.latitude_deg, b.longitude_deg);
        let ba = distance_nm(&b, a.latitude_deg, a.longitude_deg);
        assert!(((ab - ba) / ab).abs() < EPSILON);
    }

    #[test]
    fn one_degree_of_latitude_is_about_sixty_miles() {
        let s = station(0.0, 0.0);
        let d = distance_nm(&s, 1.0, 0.0);
        // 6371 km sphere: 111.195 km per degree
        assert!((d - 111.194_926_644_558_73 / 1.852).abs() < 1e-6);
        assert!((d - 60.04).abs() < 0.01);
    }

    #[test]
    fn antipodal_distance_is_half_the_circumference() {
        let half_turn = std::f64::consts::PI * EARTH_RADIUS_KM / KM_PER_NAUTICAL_MILE;
        let pairs = [
            ((-79.1189, -168.1267), (79.1189, 11.8733)),
            ((52.0, 4.0), (-52.0, -176.0)),
            ((0.0, 0.0), (0.0, 180.0)),
        ];
        for ((slat, slon), (lat, lon)) in pairs {
            let d = distance_nm(&station(slat, slon), lat, lon);
            assert!(d.is_finite(), "{slat},{slon} -> {lat},{lon}");
            assert!((d - half_turn).abs() < 1e-3, "{d}");
        }

        // sweep antipodal pairs; every distance stays finite
        for i in 0..2000 {
            let lat = -89.0 + (i as f64 * 0.0891) % 178.0;
            let lon = -179.0 + (i as f64 * 0.1791) % 179.0;
            let d = distance_nm(&station(lat, lon), -lat, lon + 180.0);
            assert!(!d.is_nan(), "{lat},{lon}");
            assert!(d >= 0.0 && d <= half_turn + 1e-6);
        }
    }

    #[test]
    fn cardinal_bearings() {
        let s = station(0.0, 0.0);
        assert!((bearing_deg(&s, 1.0, 0.0) - 0.0).abs() < EPSILON);
        assert!((bearing_deg(&s, 0.0, 1.0) - 90.0).abs() < EPSILON);
        assert!((bearing_deg(&s, -1.0, 0.0) - 180.0).abs() < EPSILON);
        assert!((bearing_deg(&s, 0.0, -1.0) - 270.0).abs() < EPSILON);
    }

    #[test]
    fn reverse_bearing_differs_by_half_turn() {
        let a = station(52.0, 4.0);
        let b = station(52.1, 4.2);
        let ab = bearing_deg(&a, b.latitude_deg, b.longitude_deg);
        let ba = bearing_deg(&b, a.latitude_deg, a.longitude_deg);
        let diff = normalize_deg(ba - ab);
        // meridian convergence over ~10 nm is well under a tenth of a degree
        assert!((diff - 180.0).abs() < 0.2, "diff = {diff}");
    }

    #[test]
    fn bearing_to_station_itself_is_zero() {
        let s = station(52.0, 4.0);
        let b = bearing_deg(&s, 52.0, 4.0);
        assert_eq!(b, 0.0);
        assert!(!b.is_nan());
    }

    #[test]
    fn bearing_is_always_in_range() {
        let s = station(10.0, 10.0);
        for lat in [-80.0, -10.0, 9.999, 10.0, 10.001, 45.0] {
            for lon in [-170.0, 9.999, 10.0, 10.001, 179.0] {
                let b = bearing_deg(&s, lat, lon);
                assert!((0.0..360.0).contains(&b), "{lat},{lon} -> {b}");
            }
        }
    }

    #[test]
    fn normalize_wraps_negatives() {
        assert_eq!(normalize_deg(-90.0), 270.0);
        assert_eq!(normalize_deg(360.0), 0.0);
        assert_eq!(normalize_deg(725.0), 5.0);
        assert_eq!(normalize_deg(-1e-300), 0.0);
    }

    #[test]
    fn position_validity() {
        assert!(is_valid_position(90.0, -180.0));
        assert!(!is_valid_position(90.1, 0.0));
        assert!(!is_valid_position(0.0, 180.5));
    }
}
