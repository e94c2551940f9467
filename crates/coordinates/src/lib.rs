use rand::Rng;
use tracing::debug;

use types::GeoPoint;

const DECIMAL_SCALE: f64 = 1_000_000.0;
const DEFAULT_JITTER_DEGREES: f64 = 0.02;

/// Approximate center of a named district.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictCenter {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl DistrictCenter {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Inclusive latitude/longitude box used for districts without a known center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.lat_min..=self.lat_max).contains(&point.latitude)
            && (self.lon_min..=self.lon_max).contains(&point.longitude)
    }
}

/// Immutable lookup table for coordinate generation.
#[derive(Debug, Clone)]
pub struct CoordinateTable {
    centers: Vec<DistrictCenter>,
    bounds: BoundingBox,
    /// Maximum offset, in degrees, applied on each axis around a known center.
    jitter_degrees: f64,
}

impl CoordinateTable {
    pub fn new(centers: Vec<DistrictCenter>, bounds: BoundingBox, jitter_degrees: f64) -> Self {
        Self {
            centers,
            bounds,
            jitter_degrees: jitter_degrees.abs(),
        }
    }

    /// The five Jakarta administrative cities and the city-wide box.
    pub fn jakarta() -> Self {
        Self::new(
            vec![
                DistrictCenter::new("Jakarta Pusat", -6.1751, 106.8650),
                DistrictCenter::new("Jakarta Selatan", -6.2615, 106.8106),
                DistrictCenter::new("Jakarta Utara", -6.1214, 106.9004),
                DistrictCenter::new("Jakarta Barat", -6.1681, 106.7588),
                DistrictCenter::new("Jakarta Timur", -6.2250, 106.9004),
            ],
            BoundingBox {
                lat_min: -6.35,
                lat_max: -6.10,
                lon_min: 106.70,
                lon_max: 107.00,
            },
            DEFAULT_JITTER_DEGREES,
        )
    }

    pub fn center(&self, district_name: &str) -> Option<&DistrictCenter> {
        self.centers.iter().find(|center| center.name == district_name)
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn jitter_degrees(&self) -> f64 {
        self.jitter_degrees
    }

    pub fn generate<R: Rng + ?Sized>(&self, district_name: &str, rng: &mut R) -> GeoPoint {
        let (latitude, longitude) = match self.center(district_name) {
            Some(center) => {
                let jitter = self.jitter_degrees;
                (
                    center.latitude + rng.gen_range(-jitter..=jitter),
                    center.longitude + rng.gen_range(-jitter..=jitter),
                )
            }
            None => {
                debug!(district = district_name, "no known center, sampling city bounds");
                (
                    rng.gen_range(self.bounds.lat_min..=self.bounds.lat_max),
                    rng.gen_range(self.bounds.lon_min..=self.bounds.lon_max),
                )
            }
        };

        GeoPoint {
            latitude: round6(latitude),
            longitude: round6(longitude),
        }
    }
}

impl Default for CoordinateTable {
    fn default() -> Self {
        Self::jakarta()
    }
}

pub fn round6(value: f64) -> f64 {
    (value * DECIMAL_SCALE).round() / DECIMAL_SCALE
}
