//! Great-circle reverse lookup over place coordinates.
//!
//! Purely geometric: no textual matching, no external spatial engine.

use serde::Serialize;

use crate::error::ValidationError;
use crate::store::GeoStore;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Search radius used when the caller does not supply one.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Reverse lookup never returns more than this many places.
pub const MAX_RESULTS: usize = 5;

/// Parameters for a reverse lookup, already type-coerced by the API layer.
/// `lat` and `lon` stay optional here so their absence surfaces as a
/// validation error rather than a deserialization failure upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
}

/// One place within the search radius.
#[derive(Debug, Clone, Serialize)]
pub struct ReverseResult {
    pub id: i64,
    pub name: String,
    pub country_code: String,
    pub admin_region: String,
    pub lat: f64,
    pub lon: f64,
    /// Distance from the query point, rounded to 2 decimals.
    pub distance_km: f64,
}

/// Great-circle distance between two coordinates, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Return up to [`MAX_RESULTS`] places within `radius_km` of the query
/// point, nearest first.
pub fn reverse(
    store: &GeoStore,
    params: &ReverseParams,
) -> Result<Vec<ReverseResult>, ValidationError> {
    let lat = params.lat.ok_or(ValidationError::MissingParameter("lat"))?;
    let lon = params.lon.ok_or(ValidationError::MissingParameter("lon"))?;
    let radius_km = params.radius_km.unwrap_or(DEFAULT_RADIUS_KM);

    let reader = store.read();
    let mut hits: Vec<(f64, ReverseResult)> = reader
        .places()
        .filter_map(|place| {
            let distance = haversine_km(lat, lon, place.lat, place.lon);
            if distance > radius_km {
                return None;
            }
            Some((
                distance,
                ReverseResult {
                    id: place.id,
                    name: place.name.clone(),
                    country_code: place.country_code.clone(),
                    admin_region: place.admin_region.clone(),
                    lat: place.lat,
                    lon: place.lon,
                    distance_km: round2(distance),
                },
            ))
        })
        .collect();

    // Sort on the exact distance; the 2-decimal rounding is presentation.
    hits.sort_by(|a, b| a.0.total_cmp(&b.0));
    hits.truncate(MAX_RESULTS);

    Ok(hits.into_iter().map(|(_, result)| result).collect())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Place;

    fn place(id: i64, name: &str, lat: f64, lon: f64) -> Place {
        Place {
            id,
            name: name.to_string(),
            ascii_name: name.to_string(),
            country_code: "GB".to_string(),
            admin_region: "ENG".to_string(),
            lat,
            lon,
            population: None,
            elevation: None,
            timezone: "Europe/London".to_string(),
            modified: None,
        }
    }

    fn fixture() -> GeoStore {
        let store = GeoStore::new();
        store.insert_place_if_absent(place(1, "London", 51.5074, -0.1278));
        store.insert_place_if_absent(place(2, "Camden Town", 51.5390, -0.1426));
        store.insert_place_if_absent(place(3, "Croydon", 51.3762, -0.0982));
        store.insert_place_if_absent(place(4, "Paris", 48.8566, 2.3522));
        store
    }

    fn at(lat: f64, lon: f64, radius_km: f64) -> ReverseParams {
        ReverseParams {
            lat: Some(lat),
            lon: Some(lon),
            radius_km: Some(radius_km),
        }
    }

    #[test]
    fn haversine_known_distances() {
        // London -> Paris is roughly 344 km.
        let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 344.0).abs() < 2.0, "got {d}");

        assert_eq!(haversine_km(51.5, -0.1, 51.5, -0.1), 0.0);
    }

    #[test]
    fn missing_coordinates_are_validation_errors() {
        let store = fixture();
        let err = reverse(
            &store,
            &ReverseParams {
                lat: None,
                lon: Some(-0.1),
                radius_km: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter("lat"));

        let err = reverse(
            &store,
            &ReverseParams {
                lat: Some(51.5),
                lon: None,
                radius_km: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter("lon"));
    }

    #[test]
    fn radius_filters_and_orders_ascending() {
        let store = fixture();
        let hits = reverse(&store, &at(51.5074, -0.1278, 10.0)).unwrap();

        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.distance_km <= 10.0));
        assert!(hits.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert_eq!(hits[0].name, "London");
        // Paris is far outside a 10 km radius.
        assert!(hits.iter().all(|h| h.name != "Paris"));
        // Croydon sits about 15 km out.
        assert!(hits.iter().all(|h| h.name != "Croydon"));
    }

    #[test]
    fn results_are_capped_at_five() {
        let store = GeoStore::new();
        for id in 0..8 {
            // A little string of places, each a couple of km further out.
            store.insert_place_if_absent(place(id, "Spot", 51.5 + 0.01 * id as f64, -0.1));
        }
        let hits = reverse(&store, &at(51.5, -0.1, 500.0)).unwrap();
        assert_eq!(hits.len(), MAX_RESULTS);
        assert_eq!(hits[0].id, 0);
    }

    #[test]
    fn default_radius_is_50km() {
        let store = fixture();
        let hits = reverse(
            &store,
            &ReverseParams {
                lat: Some(51.5074),
                lon: Some(-0.1278),
                radius_km: None,
            },
        )
        .unwrap();
        // Croydon (~15 km) is in, Paris (~344 km) is out.
        assert!(hits.iter().any(|h| h.name == "Croydon"));
        assert!(hits.iter().all(|h| h.name != "Paris"));
    }

    #[test]
    fn distances_are_rounded_to_two_decimals() {
        let store = fixture();
        let hits = reverse(&store, &at(51.5074, -0.1278, 50.0)).unwrap();
        for hit in hits {
            let scaled = hit.distance_km * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }
}
