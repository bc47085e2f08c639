//! UTM <-> WGS84 conversion for monitoring rows recorded in projected
//! coordinates (OEFA sampling sheets carry `este`/`norte`/`zona`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;

const A: f64 = 6_378_137.0;
const F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Debug, Error, PartialEq)]
pub enum UtmError {
    #[error("UTM zone {0} is outside 1..=60")]
    InvalidZone(u8),
    #[error("unknown hemisphere '{0}'")]
    InvalidHemisphere(String),
    #[error("latitude {0} is outside the UTM band (-80..=84)")]
    OutOfBand(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    #[serde(rename = "N", alias = "n", alias = "norte", alias = "north")]
    North,
    #[serde(rename = "S", alias = "s", alias = "sur", alias = "south")]
    South,
}

impl Hemisphere {
    pub fn parse(value: &str) -> Result<Self, UtmError> {
        match value.trim().to_lowercase().as_str() {
            "n" | "north" | "norte" => Ok(Self::North),
            "s" | "south" | "sur" => Ok(Self::South),
            other => Err(UtmError::InvalidHemisphere(other.to_string())),
        }
    }

    pub fn for_latitude(lat: f64) -> Self {
        if lat < 0.0 {
            Self::South
        } else {
            Self::North
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmCoordinate {
    pub easting: f64,
    pub northing: f64,
    pub zone: u8,
    pub hemisphere: Hemisphere,
}

/// Zone number (1..=60) containing a longitude.
pub fn zone_for_longitude(lng: f64) -> u8 {
    let wrapped = (lng + 180.0).rem_euclid(360.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let zone = (wrapped / 6.0).floor() as u8 + 1;
    zone.min(60)
}

fn central_meridian(zone: u8) -> f64 {
    f64::from(zone - 1).mul_add(6.0, -180.0) + 3.0
}

fn eccentricity_squared() -> f64 {
    F * (2.0 - F)
}

pub fn utm_to_wgs84(
    easting: f64,
    northing: f64,
    zone: u8,
    hemisphere: Hemisphere,
) -> Result<Coordinate, UtmError> {
    if !(1..=60).contains(&zone) {
        return Err(UtmError::InvalidZone(zone));
    }

    let e2 = eccentricity_squared();
    let ep2 = e2 / (1.0 - e2);
    let x = easting - FALSE_EASTING;
    let y = match hemisphere {
        Hemisphere::North => northing,
        Hemisphere::South => northing - FALSE_NORTHING_SOUTH,
    };

    let m = y / K0;
    let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();
    let n1 = A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let t1 = tan_phi1 * tan_phi1;
    let c1 = ep2 * cos_phi1 * cos_phi1;
    let r1 = A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * K0);

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                    - 252.0 * ep2
                    - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    let lng = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
            * d.powi(5)
            / 120.0)
        / cos_phi1;

    Ok(Coordinate::new(
        lat.to_degrees(),
        central_meridian(zone) + lng.to_degrees(),
    ))
}

pub fn wgs84_to_utm(coordinate: &Coordinate) -> Result<UtmCoordinate, UtmError> {
    if !(-80.0..=84.0).contains(&coordinate.lat) {
        return Err(UtmError::OutOfBand(coordinate.lat));
    }

    let zone = zone_for_longitude(coordinate.lng);
    let hemisphere = Hemisphere::for_latitude(coordinate.lat);
    let e2 = eccentricity_squared();
    let ep2 = e2 / (1.0 - e2);

    let phi = coordinate.lat.to_radians();
    let lambda = (coordinate.lng - central_meridian(zone)).to_radians();
    let (sin_phi, cos_phi, tan_phi) = (phi.sin(), phi.cos(), phi.tan());

    let n = A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * lambda;

    let m = A
        * ((1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e2.powi(2) / 32.0 + 45.0 * e2.powi(3) / 1024.0)
                * (2.0 * phi).sin()
            + (15.0 * e2.powi(2) / 256.0 + 45.0 * e2.powi(3) / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e2.powi(3) / 3072.0) * (6.0 * phi).sin());

    let easting = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t.powi(2) + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + FALSE_EASTING;

    let mut northing = K0
        * (m + n
            * tan_phi
            * (a.powi(2) / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c.powi(2)) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t.powi(2) + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    if hemisphere == Hemisphere::South {
        northing += FALSE_NORTHING_SOUTH;
    }

    Ok(UtmCoordinate {
        easting,
        northing,
        zone,
        hemisphere,
    })
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
    fn zone_numbers() {
        assert_eq!(zone_for_longitude(-77.04), 18);
        assert_eq!(zone_for_longitude(-3.7), 30);
        assert_eq!(zone_for_longitude(-180.0), 1);
        assert_eq!(zone_for_longitude(179.9), 60);
        assert_eq!(zone_for_longitude(180.0), 1);
    }

    #[test]
    fn central_meridian_of_zone_18_is_minus_75() {
        assert_close(central_meridian(18), -75.0, 1e-12);
    }

    #[test]
    fn point_on_central_meridian_and_equator() {
        let c = utm_to_wgs84(500_000.0, 0.0, 18, Hemisphere::North).unwrap();
        assert_close(c.lat, 0.0, 1e-9);
        assert_close(c.lng, -75.0, 1e-9);
    }

    #[test]
    fn southern_round_trip_near_lima() {
        let original = Coordinate::new(-12.046_374, -77.042_793);
        let utm = wgs84_to_utm(&original).unwrap();
        assert_eq!(utm.zone, 18);
        assert_eq!(utm.hemisphere, Hemisphere::South);
        assert!(utm.northing > 8_000_000.0 && utm.northing < 10_000_000.0);

        let back = utm_to_wgs84(utm.easting, utm.northing, utm.zone, utm.hemisphere).unwrap();
        assert_close(back.lat, original.lat, 1e-6);
        assert_close(back.lng, original.lng, 1e-6);
    }

    #[test]
    fn northern_round_trip_madrid() {
        let original = Coordinate::new(40.4168, -3.7038);
        let utm = wgs84_to_utm(&original).unwrap();
        assert_eq!(utm.zone, 30);
        // Puerta del Sol sits near 440 km E, 4 474 km N in zone 30.
        assert_close(utm.easting, 440_300.0, 500.0);
        assert_close(utm.northing, 4_474_250.0, 500.0);

        let back = utm_to_wgs84(utm.easting, utm.northing, 30, Hemisphere::North).unwrap();
        assert_close(back.lat, original.lat, 1e-6);
        assert_close(back.lng, original.lng, 1e-6);
    }

    #[test]
    fn rejects_bad_zone_and_hemisphere() {
        assert_eq!(
            utm_to_wgs84(0.0, 0.0, 0, Hemisphere::North),
            Err(UtmError::InvalidZone(0))
        );
        assert!(Hemisphere::parse("x").is_err());
        assert_eq!(Hemisphere::parse(" Sur "), Ok(Hemisphere::South));
    }
}
