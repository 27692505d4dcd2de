//! Location — a named geofence a location-bound rule attaches to.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Valid latitude range, degrees.
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range, degrees.
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// A named circular geofence owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub location_id: i64,
  pub name:        String,
  pub latitude:    f64,
  pub longitude:   f64,
  pub radius:      f64,
}

impl Location {
  /// Exact-match test used by the lazy find-or-create lookup. Two locations
  /// are the same only when all four fields match exactly; the coordinate
  /// comparison is intentionally bitwise, not tolerance-based.
  pub fn matches(
    &self,
    name: &str,
    latitude: f64,
    longitude: f64,
    radius: f64,
  ) -> bool {
    self.name == name
      && self.latitude == latitude
      && self.longitude == longitude
      && self.radius == radius
  }
}
