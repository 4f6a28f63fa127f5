//! Geospatial operators

use super::number;
use crate::condition::cache::DistanceKey;
use crate::condition::{ConditionCaches, Dispatch};
use verdict_core::FeelValue;

pub(crate) const OPERATORS: &[&str] = &["within_radius", "in_polygon"];

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `{lat, lon}` (also `latitude`/`longitude`/`lng`) or `[lat, lon]`
    pub fn from_value(value: &FeelValue) -> Option<Self> {
        match value {
            FeelValue::List(items) if items.len() == 2 => {
                Some(Self::new(number(&items[0])?, number(&items[1])?))
            }
            FeelValue::Context(map) => {
                let lat = map.get("lat").or_else(|| map.get("latitude"))?;
                let lon = map
                    .get("lon")
                    .or_else(|| map.get("lng"))
                    .or_else(|| map.get("longitude"))?;
                Some(Self::new(number(lat)?, number(lon)?))
            }
            _ => None,
        }
    }

    fn cache_key(&self) -> (i64, i64) {
        ((self.lat * 1e4).round() as i64, (self.lon * 1e4).round() as i64)
    }
}

/// Great-circle distance in kilometres
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Ray casting test; points on an edge may fall either way
pub fn point_in_polygon(point: GeoPoint, polygon: &[GeoPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for (i, vi) in polygon.iter().enumerate() {
        let vj = polygon[j];
        if (vi.lat > point.lat) != (vj.lat > point.lat)
            && point.lon < (vj.lon - vi.lon) * (point.lat - vi.lat) / (vj.lat - vi.lat) + vi.lon
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub(crate) fn evaluate(
    op: &str,
    actual: &FeelValue,
    expected: &FeelValue,
    caches: &ConditionCaches,
) -> Dispatch {
    let result = match op {
        "within_radius" => within_radius(actual, expected, caches),
        "in_polygon" => in_polygon(actual, expected),
        _ => return Dispatch::NotMine,
    };
    Dispatch::Handled(result.unwrap_or(false))
}

/// `{"center": <point>, "radius_km": n}`
fn within_radius(actual: &FeelValue, expected: &FeelValue, caches: &ConditionCaches) -> Option<bool> {
    let point = GeoPoint::from_value(actual)?;
    let center = GeoPoint::from_value(expected.get("center")?)?;
    let radius = expected
        .get("radius_km")
        .or_else(|| expected.get("radius"))
        .and_then(number)?;
    let ((a1, a2), (b1, b2)) = (point.cache_key(), center.cache_key());
    let key: DistanceKey = (a1, a2, b1, b2);
    let distance = caches
        .distances
        .get_or_insert_with(&key, || haversine_distance(point, center));
    Some(distance <= radius)
}

/// `[<point>, ...]` or `{"polygon": [<point>, ...]}`
fn in_polygon(actual: &FeelValue, expected: &FeelValue) -> Option<bool> {
    let point = GeoPoint::from_value(actual)?;
    let vertices = match expected {
        FeelValue::Context(_) => expected.get("polygon")?.as_list()?,
        other => other.as_list()?,
    };
    let polygon = vertices
        .iter()
        .map(GeoPoint::from_value)
        .collect::<Option<Vec<_>>>()?;
    Some(point_in_polygon(point, &polygon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(op: &str, actual: serde_json::Value, expected: serde_json::Value) -> bool {
        let caches = ConditionCaches::new();
        evaluate(
            op,
            &FeelValue::from_json(&actual),
            &FeelValue::from_json(&expected),
            &caches,
        ) == Dispatch::Handled(true)
    }

    #[test]
    fn test_haversine_known_distance() {
        let paris = GeoPoint::new(48.8566, 2.3522);
        let london = GeoPoint::new(51.5074, -0.1278);
        let d = haversine_distance(paris, london);
        assert!((d - 343.5).abs() < 1.0, "{}", d);
        assert_eq!(haversine_distance(paris, paris), 0.0);
    }

    #[test]
    fn test_within_radius() {
        let expected = json!({"center": {"lat": 48.8566, "lon": 2.3522}, "radius_km": 400});
        assert!(check("within_radius", json!({"lat": 51.5074, "lng": -0.1278}), expected.clone()));
        assert!(!check("within_radius", json!([40.7128, -74.0060]), expected));
        assert!(!check("within_radius", json!("Paris"), json!({"center": [0, 0], "radius_km": 1})));
    }

    #[test]
    fn test_in_polygon() {
        let square = json!([[0, 0], [0, 10], [10, 10], [10, 0]]);
        assert!(check("in_polygon", json!([5, 5]), square.clone()));
        assert!(!check("in_polygon", json!([15, 5]), square.clone()));
        assert!(check("in_polygon", json!({"lat": 1, "lon": 9}), json!({"polygon": square})));
        assert!(!check("in_polygon", json!([1, 1]), json!([[0, 0], [0, 10]])));
    }

    #[test]
    fn test_distance_memoized() {
        let caches = ConditionCaches::new();
        let expected = FeelValue::from_json(&json!({"center": [0, 0], "radius_km": 500}));
        let point = FeelValue::from_json(&json!([1, 1]));
        for _ in 0..4 {
            assert_eq!(evaluate("within_radius", &point, &expected, &caches), Dispatch::Handled(true));
        }
        assert_eq!(caches.stats().distances, 1);
    }
}
