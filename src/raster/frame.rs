//! In-memory grids and their dated counterpart.

use crate::raster::error::RasterError;
use crate::types::extent::SpatialExtent;
use chrono::NaiveDate;
use std::fmt;

/// Axis-aligned bounds in the units of a raster's CRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// The overlapping part of both bounds, `None` when they only touch or
    /// are disjoint.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);
        if min_x < max_x && min_y < max_y {
            Some(Bounds::new(min_x, min_y, max_x, max_y))
        } else {
            None
        }
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }
}

impl From<SpatialExtent> for Bounds {
    fn from(extent: SpatialExtent) -> Self {
        Bounds::new(extent.west(), extent.south(), extent.east(), extent.north())
    }
}

/// Coordinate reference system of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG:4326, longitude/latitude degrees.
    Wgs84,
    /// EPSG:3857, spherical Mercator metres.
    WebMercator,
    /// The MODIS sinusoidal grid, metres on a sphere of radius 6371007.181 m.
    /// It has no EPSG code.
    Sinusoidal,
    /// Any other EPSG code. Carried along but not transformable.
    Epsg(u32),
}

impl Crs {
    pub fn from_epsg(code: u32) -> Self {
        match code {
            4326 => Crs::Wgs84,
            3857 | 900913 => Crs::WebMercator,
            other => Crs::Epsg(other),
        }
    }

    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Wgs84 => Some(4326),
            Crs::WebMercator => Some(3857),
            Crs::Sinusoidal => None,
            Crs::Epsg(code) => Some(*code),
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Wgs84)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.epsg() {
            Some(code) => write!(f, "EPSG:{}", code),
            None => f.write_str("MODIS sinusoidal"),
        }
    }
}

/// Size, placement and CRS of a grid, without its cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub bounds: Bounds,
    pub crs: Crs,
}

impl Grid {
    /// Cell size as `(x, y)`, both positive.
    pub fn resolution(&self) -> (f64, f64) {
        (
            self.bounds.width() / self.width as f64,
            self.bounds.height() / self.height as f64,
        )
    }

    /// Centre of the cell at `(col, row)` in CRS units.
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        let (x_res, y_res) = self.resolution();
        (
            self.bounds.min_x + (col as f64 + 0.5) * x_res,
            self.bounds.max_y - (row as f64 + 0.5) * y_res,
        )
    }

    /// `true` when both have the same CRS, size and bounds.
    pub fn matches(&self, other: &Grid) -> bool {
        const EPS: f64 = 1e-9;
        let (a, b) = (self.bounds, other.bounds);
        self.crs == other.crs
            && self.width == other.width
            && self.height == other.height
            && (a.min_x - b.min_x).abs() < EPS
            && (a.min_y - b.min_y).abs() < EPS
            && (a.max_x - b.max_x).abs() < EPS
            && (a.max_y - b.max_y).abs() < EPS
    }
}

/// A single-band grid of `f32` cells.
///
/// Cells are stored row-major from north to south, west to east. `NaN` marks
/// no-data.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    bounds: Bounds,
    crs: Crs,
    values: Vec<f32>,
}

impl Raster {
    pub fn new(
        width: usize,
        height: usize,
        bounds: Bounds,
        crs: Crs,
        values: Vec<f32>,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 || values.len() != width * height {
            return Err(RasterError::SizeMismatch {
                width,
                height,
                cells: values.len(),
            });
        }
        if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
            return Err(RasterError::DegenerateBounds(bounds));
        }
        Ok(Self {
            width,
            height,
            bounds,
            crs,
            values,
        })
    }

    /// A grid with every cell set to `value`.
    pub fn filled(
        width: usize,
        height: usize,
        bounds: Bounds,
        crs: Crs,
        value: f32,
    ) -> Result<Self, RasterError> {
        Self::new(width, height, bounds, crs, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    pub fn grid(&self) -> Grid {
        Grid {
            width: self.width,
            height: self.height,
            bounds: self.bounds,
            crs: self.crs,
        }
    }

    /// Cell size as `(x, y)`, both positive.
    pub fn resolution(&self) -> (f64, f64) {
        self.grid().resolution()
    }

    /// Value of the cell at `(col, row)`, `None` for no-data or out of range.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let value = self.values[row * self.width + col];
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

    /// Centre of the cell at `(col, row)` in CRS units.
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.grid().cell_center(col, row)
    }

    /// Index of the cell containing `(x, y)`. Points on the eastern or
    /// southern edge belong to the last column or row.
    pub fn cell_index(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let (x_res, y_res) = self.resolution();
        let col = (((x - self.bounds.min_x) / x_res).floor() as usize).min(self.width - 1);
        let row = (((self.bounds.max_y - y) / y_res).floor() as usize).min(self.height - 1);
        Some((col, row))
    }

    /// Nearest-cell value at `(x, y)`.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f32> {
        let (col, row) = self.cell_index(x, y)?;
        self.get(col, row)
    }

    pub fn valid_cells(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// `true` when `other` has the same CRS, size and bounds.
    pub fn same_grid(&self, other: &Raster) -> bool {
        self.grid().matches(&other.grid())
    }
}

/// A raster tagged with the date it was acquired on.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub date: NaiveDate,
    pub raster: Raster,
}

impl Frame {
    pub fn new(date: NaiveDate, raster: Raster) -> Self {
        Self { date, raster }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Raster {
        // 2x2 over [0, 2] x [0, 2]
        Raster::new(
            2,
            2,
            Bounds::new(0.0, 0.0, 2.0, 2.0),
            Crs::Wgs84,
            vec![1.0, 2.0, 3.0, f32::NAN],
        )
        .unwrap()
    }

    #[test]
    fn test_value_at_uses_north_up_rows() {
        let raster = grid();
        assert_eq!(raster.value_at(0.5, 1.5), Some(1.0));
        assert_eq!(raster.value_at(1.5, 1.5), Some(2.0));
        assert_eq!(raster.value_at(0.5, 0.5), Some(3.0));
        assert_eq!(raster.value_at(1.5, 0.5), None);
    }

    #[test]
    fn test_value_at_edges() {
        let raster = grid();
        assert_eq!(raster.value_at(2.0, 2.0), Some(2.0));
        assert_eq!(raster.value_at(0.0, 0.0), Some(3.0));
        assert_eq!(raster.value_at(2.1, 1.0), None);
    }

    #[test]
    fn test_size_is_checked() {
        let result = Raster::new(
            3,
            2,
            Bounds::new(0.0, 0.0, 1.0, 1.0),
            Crs::Wgs84,
            vec![0.0; 5],
        );
        assert!(matches!(result, Err(RasterError::SizeMismatch { .. })));
    }

    #[test]
    fn test_crs_codes() {
        assert_eq!(Crs::from_epsg(4326), Crs::Wgs84);
        assert_eq!(Crs::from_epsg(3857), Crs::WebMercator);
        assert_eq!(Crs::from_epsg(32632).to_string(), "EPSG:32632");
        assert_eq!(Crs::Sinusoidal.epsg(), None);
        assert_eq!(Crs::Sinusoidal.to_string(), "MODIS sinusoidal");
    }
}
