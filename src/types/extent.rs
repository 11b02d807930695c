//! Geographic inputs of a request: bounding boxes, point sets and the tagged
//! [`SpatialQuery`] the pipeline branches on.

use crate::error::ValidationError;
use std::fmt;

/// A geographical coordinate as `(longitude, latitude)` in WGS84 degrees.
///
/// Longitude is the first element (index 0), latitude the second (index 1).
///
/// # Examples
///
/// ```
/// use rasterharvest::LonLat;
///
/// let zurich = LonLat(8.5417, 47.3769);
/// assert_eq!(zurich.0, 8.5417); // Longitude
/// assert_eq!(zurich.1, 47.3769); // Latitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat(pub f64, pub f64);

impl LonLat {
    pub fn lon(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let valid = self.0.is_finite()
            && self.1.is_finite()
            && (-180.0..=180.0).contains(&self.0)
            && (-90.0..=90.0).contains(&self.1);
        if valid {
            Ok(())
        } else {
            Err(ValidationError::InvalidCoordinate {
                lon: self.0,
                lat: self.1,
            })
        }
    }
}

/// A WGS84 bounding box.
///
/// Construction guarantees `west < east`, `south < north` and that every bound
/// lies within `[-180, 180] x [-90, 90]`.
///
/// # Examples
///
/// ```
/// use rasterharvest::SpatialExtent;
///
/// let alps = SpatialExtent::new(6.0, 45.5, 10.5, 47.8).unwrap();
/// assert!(alps.contains(8.0, 46.5));
///
/// // Bounds in the wrong order are rejected
/// assert!(SpatialExtent::new(10.5, 45.5, 6.0, 47.8).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialExtent {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl SpatialExtent {
    /// The whole globe.
    pub const WORLD: SpatialExtent = SpatialExtent {
        west: -180.0,
        south: -90.0,
        east: 180.0,
        north: 90.0,
    };

    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, ValidationError> {
        let invalid = |reason: &'static str| ValidationError::InvalidExtent {
            west,
            south,
            east,
            north,
            reason,
        };
        if ![west, south, east, north].iter().all(|v| v.is_finite()) {
            return Err(invalid("bounds must be finite"));
        }
        if west >= east {
            return Err(invalid("west must be smaller than east"));
        }
        if south >= north {
            return Err(invalid("south must be smaller than north"));
        }
        if west < -180.0 || east > 180.0 || south < -90.0 || north > 90.0 {
            return Err(invalid("bounds must lie within [-180, 180] x [-90, 90]"));
        }
        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// The bounding box of `points`, padded by `margin` degrees on every side
    /// and clamped to the world bounds.
    pub fn around(points: &PointSet, margin: f64) -> Result<Self, ValidationError> {
        let mut west = f64::INFINITY;
        let mut south = f64::INFINITY;
        let mut east = f64::NEG_INFINITY;
        let mut north = f64::NEG_INFINITY;
        for point in points.iter() {
            west = west.min(point.0);
            east = east.max(point.0);
            south = south.min(point.1);
            north = north.max(point.1);
        }
        let margin = margin.max(0.0);
        Self::new(
            (west - margin).max(-180.0),
            (south - margin).max(-90.0),
            (east + margin).min(180.0),
            (north + margin).min(90.0),
        )
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    /// `[west, south, east, north]`, the STAC `bbox` order.
    pub fn to_bbox(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    pub fn is_within(&self, other: &SpatialExtent) -> bool {
        self.west >= other.west
            && self.east <= other.east
            && self.south >= other.south
            && self.north <= other.north
    }

    /// The part of `self` inside `other`, `None` unless they share an area.
    pub fn intersection(&self, other: &SpatialExtent) -> Option<SpatialExtent> {
        SpatialExtent::new(
            self.west.max(other.west),
            self.south.max(other.south),
            self.east.min(other.east),
            self.north.min(other.north),
        )
        .ok()
    }

    /// The four corners, clockwise from the north-west one.
    pub fn corners(&self) -> [LonLat; 4] {
        [
            LonLat(self.west, self.north),
            LonLat(self.east, self.north),
            LonLat(self.east, self.south),
            LonLat(self.west, self.south),
        ]
    }
}

impl fmt::Display for SpatialExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.west, self.south, self.east, self.north
        )
    }
}

/// An ordered, non-empty set of WGS84 points.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet(Vec<LonLat>);

impl PointSet {
    pub fn new(points: Vec<LonLat>) -> Result<Self, ValidationError> {
        if points.is_empty() {
            return Err(ValidationError::EmptyPointSet);
        }
        for point in &points {
            point.validate()?;
        }
        Ok(Self(points))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LonLat> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[LonLat] {
        &self.0
    }
}

impl TryFrom<Vec<LonLat>> for PointSet {
    type Error = ValidationError;

    fn try_from(points: Vec<LonLat>) -> Result<Self, Self::Error> {
        PointSet::new(points)
    }
}

/// What a request covers: a box, or a set of points to sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialQuery {
    Area(SpatialExtent),
    Points(PointSet),
}

impl SpatialQuery {
    /// The extent tiles are searched and assembled for. Point queries are
    /// padded by `point_margin` degrees.
    pub fn search_extent(&self, point_margin: f64) -> Result<SpatialExtent, ValidationError> {
        match self {
            SpatialQuery::Area(extent) => Ok(*extent),
            SpatialQuery::Points(points) => SpatialExtent::around(points, point_margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_rejects_bad_bounds() {
        assert!(SpatialExtent::new(0.0, 0.0, 1.0, 1.0).is_ok());
        assert!(SpatialExtent::new(1.0, 0.0, 1.0, 1.0).is_err());
        assert!(SpatialExtent::new(0.0, 2.0, 1.0, 1.0).is_err());
        assert!(SpatialExtent::new(-181.0, 0.0, 1.0, 1.0).is_err());
        assert!(SpatialExtent::new(0.0, 0.0, 1.0, 91.0).is_err());
        assert!(SpatialExtent::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_extent_around_points_is_padded_and_clamped() {
        let points = PointSet::new(vec![LonLat(179.95, 10.0), LonLat(170.0, 12.0)]).unwrap();
        let extent = SpatialExtent::around(&points, 0.2).unwrap();
        assert!((extent.west() - 169.8).abs() < 1e-9);
        assert_eq!(extent.east(), 180.0);
        assert!((extent.south() - 9.8).abs() < 1e-9);
        assert!((extent.north() - 12.2).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_gets_a_valid_extent() {
        let points = PointSet::new(vec![LonLat(5.0, 52.0)]).unwrap();
        let extent = SpatialQuery::Points(points).search_extent(0.1).unwrap();
        assert!(extent.contains(5.0, 52.0));
        assert!((extent.east() - extent.west() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_point_set_validation() {
        assert!(matches!(
            PointSet::new(vec![]),
            Err(ValidationError::EmptyPointSet)
        ));
        assert!(matches!(
            PointSet::new(vec![LonLat(200.0, 0.0)]),
            Err(ValidationError::InvalidCoordinate { .. })
        ));
    }
}
