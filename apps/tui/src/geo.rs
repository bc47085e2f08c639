//! Great-circle geometry on the mean-radius sphere.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by every distance in the dashboard.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius large enough to cover the whole globe (half the circumference).
pub const WORLD_RADIUS_KM: f64 = EARTH_RADIUS_KM * std::f64::consts::PI;

/// Great-circle distance in kilometres between two WGS84 positions.
///
/// No validation is performed: a NaN in any argument yields NaN.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lng = (d_lng / 2.0).sin();
    let a = (lat1.to_radians().cos() * lat2.to_radians().cos())
        .mul_add(sin_lng * sin_lng, sin_lat * sin_lat);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }

    /// Initial bearing in degrees clockwise from north, in [0, 360).
    pub fn bearing_to(&self, other: &Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let y = d_lng.sin() * lat2.cos();
        let x = lat1
            .cos()
            .mul_add(lat2.sin(), -(lat1.sin() * lat2.cos() * d_lng.cos()));
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// Position reached by travelling `distance_km` along `bearing_deg`.
    pub fn destination(&self, bearing_deg: f64, distance_km: f64) -> Self {
        let delta = distance_km / EARTH_RADIUS_KM;
        let theta = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lng1 = self.lng.to_radians();

        let lat2 = lat1
            .sin()
            .mul_add(delta.cos(), lat1.cos() * delta.sin() * theta.cos())
            .asin();
        let lng2 = lng1
            + (theta.sin() * delta.sin() * lat1.cos())
                .atan2(lat1.sin().mul_add(-lat2.sin(), delta.cos()));

        Self::new(
            lat2.to_degrees(),
            (lng2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0,
        )
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Closed ring of `segments + 1` positions approximating a circle on the sphere.
pub fn circle_polygon(center: &Coordinate, radius_km: f64, segments: usize) -> Vec<Coordinate> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let bearing = 360.0 * i as f64 / segments as f64;
            center.destination(bearing, radius_km)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert!(haversine_km(-11.525, -76.975, -11.525, -76.975).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let forward = haversine_km(-11.525, -76.975, -14.625, -74.125);
        let backward = haversine_km(-14.625, -74.125, -11.525, -76.975);
        assert_close(forward, backward, 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_km(-11.525, -76.975, -10.525, -76.975);
        assert_close(d, 111.0, 1.0);
    }

    #[test]
    fn lima_to_ica_sample_is_plausible() {
        // Casma central sample to the Ica sample, roughly 460 km apart.
        let d = haversine_km(-11.525, -76.975, -14.625, -74.125);
        assert!(d > 440.0 && d < 480.0, "got {d}");
    }

    #[test]
    fn nan_propagates() {
        assert!(haversine_km(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn destination_lands_at_requested_distance() {
        let center = Coordinate::new(-11.525, -76.975);
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0] {
            let target = center.destination(bearing, 20.0);
            assert_close(center.distance_km(&target), 20.0, 1e-6);
            let heading = center.bearing_to(&target);
            let diff = (heading - bearing + 540.0).rem_euclid(360.0) - 180.0;
            assert_close(diff, 0.0, 1e-6);
        }
    }

    #[test]
    fn coordinate_range_check() {
        assert!(Coordinate::new(-11.5, -76.9).is_valid());
        assert!(!Coordinate::new(-91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn circle_polygon_is_closed() {
        let center = Coordinate::new(-11.525, -76.975);
        let ring = circle_polygon(&center, 20.0, 36);
        assert_eq!(ring.len(), 37);
        assert_close(ring[0].lat, ring[36].lat, 1e-9);
        assert_close(ring[0].lng, ring[36].lng, 1e-9);
        for point in &ring {
            assert_close(center.distance_km(point), 20.0, 1e-6);
        }
    }
}
