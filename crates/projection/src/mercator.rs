//! Spherical (Web) Mercator projection, EPSG:3857.
//!
//! Uses the WGS84 semi-major axis as the sphere radius, so x/y are the
//! "meters" used by web map tiles. Distances are only true at the equator;
//! at 33°N one planar unit is about 0.84 ground meters.

use std::f64::consts::PI;

/// WGS84 semi-major axis, the sphere radius of EPSG:3857.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit where the projection becomes square (≈85.0511°).
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Half the projected width of the world.
pub const MAX_EXTENT: f64 = PI * EARTH_RADIUS;

#[derive(Debug, Clone, Copy)]
pub struct WebMercator {
    radius: f64,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self {
            radius: EARTH_RADIUS,
        }
    }
}

impl WebMercator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geographic (lon, lat in degrees) to planar (x, y in meters).
    ///
    /// Latitudes beyond ±[`MAX_LATITUDE`] are clamped.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let x = self.radius * lon.to_radians();
        let y = self.radius * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }

    /// Planar (x, y in meters) back to geographic (lon, lat in degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / self.radius).to_degrees();
        let lat = (2.0 * (y / self.radius).exp().atan() - PI / 2.0).to_degrees();
        (lon, lat)
    }

    /// Ground meters represented by one planar unit at `lat`.
    pub fn ground_scale(&self, lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().cos()
    }
}
