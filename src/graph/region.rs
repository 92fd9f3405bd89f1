use geo::Point;
use serde::{Deserialize, Serialize};

/// Centroid of a region in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
}

impl Centroid {
    #[inline] pub fn new(lat: f64, lon: f64) -> Self { Self { lat, lon } }

    /// True if both coordinates are finite and within the valid lat/lon ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Convert to a `geo` point (x = longitude, y = latitude).
    #[inline] pub fn to_point(&self) -> Point<f64> { Point::new(self.lon, self.lat) }
}

/// An atomic geographic unit (e.g. a county) to be assigned to a district.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Stable unique identifier, e.g. a county GEOID.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub population: u64,
    pub centroid: Centroid,
}

impl Region {
    pub fn new(id: impl Into<String>, population: u64, lat: f64, lon: f64) -> Self {
        Self { id: id.into(), name: None, population, centroid: Centroid::new(lat, lon) }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display label: the name if present, otherwise the id.
    #[inline] pub fn label(&self) -> &str { self.name.as_deref().unwrap_or(&self.id) }
}
