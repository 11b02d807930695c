//! Grid algorithms backing the default [`crate::RasterEngine`] operations.

use crate::processing::aggregation::BucketRule;
use crate::raster::error::RasterError;
use crate::raster::frame::{Bounds, Crs, Frame, Grid, Raster};
use crate::types::extent::LonLat;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const SNAP_EPSILON: f64 = 1e-9;
const EARTH_RADIUS: f64 = 6_378_137.0;
const SINUSOIDAL_RADIUS: f64 = 6_371_007.181;
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;
const EDGE_SAMPLES: usize = 32;

/// Statistic used to collapse several values of the same cell into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reducer {
    #[default]
    Mean,
    Sum,
    Min,
    Max,
}

impl Reducer {
    /// Reduces `values`, ignoring no-data. `NaN` when nothing is left.
    pub fn reduce(&self, values: &[f32]) -> f32 {
        let mut valid = values.iter().copied().filter(|v| !v.is_nan()).peekable();
        if valid.peek().is_none() {
            return f32::NAN;
        }
        match self {
            Reducer::Mean => {
                let (sum, count) = valid.fold((0.0f64, 0usize), |(s, c), v| (s + v as f64, c + 1));
                (sum / count as f64) as f32
            }
            Reducer::Sum => valid.map(|v| v as f64).sum::<f64>() as f32,
            Reducer::Min => valid.fold(f32::INFINITY, f32::min),
            Reducer::Max => valid.fold(f32::NEG_INFINITY, f32::max),
        }
    }
}

impl FromStr for Reducer {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" | "avg" => Ok(Reducer::Mean),
            "sum" => Ok(Reducer::Sum),
            "min" => Ok(Reducer::Min),
            "max" => Ok(Reducer::Max),
            _ => Err(RasterError::UnknownReducer(s.to_string())),
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reducer::Mean => "mean",
            Reducer::Sum => "sum",
            Reducer::Min => "min",
            Reducer::Max => "max",
        };
        f.write_str(name)
    }
}

/// Cuts `raster` down to the cells overlapping `bounds`.
///
/// The result stays on the source grid: partially covered edge cells are kept
/// whole, nothing outside the source is invented.
pub fn clip(raster: &Raster, bounds: &Bounds) -> Result<Raster, RasterError> {
    let source = raster.bounds();
    let overlap = source
        .intersection(bounds)
        .ok_or(RasterError::NoOverlap(*bounds))?;
    let (x_res, y_res) = raster.resolution();

    let col_start = (((overlap.min_x - source.min_x) / x_res) + SNAP_EPSILON).floor() as usize;
    let col_end = (((overlap.max_x - source.min_x) / x_res) - SNAP_EPSILON).ceil() as usize;
    let row_start = (((source.max_y - overlap.max_y) / y_res) + SNAP_EPSILON).floor() as usize;
    let row_end = (((source.max_y - overlap.min_y) / y_res) - SNAP_EPSILON).ceil() as usize;

    let col_start = col_start.min(raster.width() - 1);
    let row_start = row_start.min(raster.height() - 1);
    let col_end = col_end.clamp(col_start + 1, raster.width());
    let row_end = row_end.clamp(row_start + 1, raster.height());

    let width = col_end - col_start;
    let height = row_end - row_start;
    let mut values = Vec::with_capacity(width * height);
    for row in row_start..row_end {
        let offset = row * raster.width();
        values.extend_from_slice(&raster.values()[offset + col_start..offset + col_end]);
    }
    let clipped = Bounds::new(
        source.min_x + col_start as f64 * x_res,
        source.max_y - row_end as f64 * y_res,
        source.min_x + col_end as f64 * x_res,
        source.max_y - row_start as f64 * y_res,
    );
    Raster::new(width, height, clipped, raster.crs(), values)
}

/// The grid covering every raster, trimmed to `within` when given.
///
/// The grid takes the first raster's resolution and lattice; its edges are
/// snapped outward onto that lattice.
///
/// # Errors
///
/// * [`RasterError::EmptyMosaic`] without rasters.
/// * [`RasterError::CrsMismatch`] when the rasters do not share a CRS.
/// * [`RasterError::NoOverlap`] when the rasters miss `within`.
pub fn covering_grid<'r>(
    rasters: impl IntoIterator<Item = &'r Raster>,
    within: Option<&Bounds>,
) -> Result<Grid, RasterError> {
    let mut rasters = rasters.into_iter();
    let first = rasters.next().ok_or(RasterError::EmptyMosaic)?;
    let mut union = first.bounds();
    for raster in rasters {
        if raster.crs() != first.crs() {
            return Err(RasterError::CrsMismatch {
                expected: first.crs(),
                found: raster.crs(),
            });
        }
        union = union.union(&raster.bounds());
    }
    let covered = match within {
        Some(within) => union
            .intersection(within)
            .ok_or(RasterError::NoOverlap(*within))?,
        None => union,
    };

    let origin = first.bounds();
    let (x_res, y_res) = first.resolution();
    let col_start = ((covered.min_x - origin.min_x) / x_res + SNAP_EPSILON).floor();
    let col_end = ((covered.max_x - origin.min_x) / x_res - SNAP_EPSILON).ceil();
    let row_start = ((origin.max_y - covered.max_y) / y_res + SNAP_EPSILON).floor();
    let row_end = ((origin.max_y - covered.min_y) / y_res - SNAP_EPSILON).ceil();
    let width = ((col_end - col_start) as usize).max(1);
    let height = ((row_end - row_start) as usize).max(1);
    let min_x = origin.min_x + col_start * x_res;
    let max_y = origin.max_y - row_start * y_res;
    Ok(Grid {
        width,
        height,
        bounds: Bounds::new(
            min_x,
            max_y - height as f64 * y_res,
            min_x + width as f64 * x_res,
            max_y,
        ),
        crs: first.crs(),
    })
}

/// Resamples overlapping rasters onto `grid`.
///
/// Every output cell is the `reducer` over the valid values the inputs hold
/// at its centre; cells no input covers are no-data.
pub fn mosaic_onto(rasters: &[Raster], grid: &Grid, reducer: Reducer) -> Result<Raster, RasterError> {
    if rasters.is_empty() {
        return Err(RasterError::EmptyMosaic);
    }
    if let Some(other) = rasters.iter().find(|r| r.crs() != grid.crs) {
        return Err(RasterError::CrsMismatch {
            expected: grid.crs,
            found: other.crs(),
        });
    }
    let mut values = Vec::with_capacity(grid.width * grid.height);
    let mut stack = Vec::with_capacity(rasters.len());
    for row in 0..grid.height {
        for col in 0..grid.width {
            let (x, y) = grid.cell_center(col, row);
            stack.clear();
            stack.extend(rasters.iter().filter_map(|r| r.value_at(x, y)));
            values.push(reducer.reduce(&stack));
        }
    }
    Raster::new(grid.width, grid.height, grid.bounds, grid.crs, values)
}

/// Combines overlapping rasters into one grid covering all of them.
///
/// The output uses the first raster's resolution. A single input is returned
/// as is.
pub fn mosaic(rasters: &[Raster], reducer: Reducer) -> Result<Raster, RasterError> {
    if let [single] = rasters {
        return Ok(single.clone());
    }
    let grid = covering_grid(rasters, None)?;
    mosaic_onto(rasters, &grid, reducer)
}

fn lon_lat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

fn mercator_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

fn lon_lat_to_sinusoidal(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.to_radians();
    (SINUSOIDAL_RADIUS * lon.to_radians() * lat.cos(), SINUSOIDAL_RADIUS * lat)
}

/// Longitudes beyond +-180 mean the point lies outside the projected world.
fn sinusoidal_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lat = y / SINUSOIDAL_RADIUS;
    let lon = x / (SINUSOIDAL_RADIUS * lat.cos());
    (lon.to_degrees(), lat.to_degrees())
}

/// Maps a coordinate from one CRS into another, passing through WGS84.
pub fn transform_point(from: Crs, to: Crs, x: f64, y: f64) -> Result<(f64, f64), RasterError> {
    if from == to {
        return Ok((x, y));
    }
    let unsupported = || RasterError::UnsupportedCrs { from, to };
    let (lon, lat) = match from {
        Crs::Wgs84 => (x, y),
        Crs::WebMercator => mercator_to_lon_lat(x, y),
        Crs::Sinusoidal => sinusoidal_to_lon_lat(x, y),
        Crs::Epsg(_) => return Err(unsupported()),
    };
    match to {
        Crs::Wgs84 => Ok((lon, lat)),
        Crs::WebMercator => Ok(lon_lat_to_mercator(lon, lat)),
        Crs::Sinusoidal => Ok(lon_lat_to_sinusoidal(lon, lat)),
        Crs::Epsg(_) => Err(unsupported()),
    }
}

/// Bounds in `to` enclosing `bounds` from `from`.
///
/// Points along every edge are transformed, so curved edges are covered.
/// Results outside the WGS84 world are clamped or dropped.
pub fn transform_bounds(bounds: &Bounds, from: Crs, to: Crs) -> Result<Bounds, RasterError> {
    if from == to {
        return Ok(*bounds);
    }
    let mut edge_points = Vec::with_capacity(4 * (EDGE_SAMPLES + 1));
    for i in 0..=EDGE_SAMPLES {
        let t = i as f64 / EDGE_SAMPLES as f64;
        let x = bounds.min_x + t * bounds.width();
        let y = bounds.min_y + t * bounds.height();
        edge_points.extend([
            (x, bounds.min_y),
            (x, bounds.max_y),
            (bounds.min_x, y),
            (bounds.max_x, y),
        ]);
    }

    let mut enclosing: Option<Bounds> = None;
    for (x, y) in edge_points {
        let (tx, ty) = transform_point(from, to, x, y)?;
        let (tx, ty) = if to == Crs::Wgs84 {
            (tx.clamp(-180.0, 180.0), ty.clamp(-90.0, 90.0))
        } else {
            (tx, ty)
        };
        if !(tx.is_finite() && ty.is_finite()) {
            continue;
        }
        let point = Bounds::new(tx, ty, tx, ty);
        enclosing = Some(enclosing.map_or(point, |b| b.union(&point)));
    }
    match enclosing {
        Some(b) if b.width() > 0.0 && b.height() > 0.0 => Ok(b),
        _ => Err(RasterError::DegenerateBounds(*bounds)),
    }
}

/// Resamples `raster` into `target` by nearest-neighbour inverse mapping,
/// keeping its cell count.
///
/// Target cells whose source location falls outside the raster are no-data.
pub fn reproject(raster: &Raster, target: Crs) -> Result<Raster, RasterError> {
    let from = raster.crs();
    if from == target {
        return Ok(raster.clone());
    }
    let bounds = transform_bounds(&raster.bounds(), from, target)?;
    let grid = Grid {
        width: raster.width(),
        height: raster.height(),
        bounds,
        crs: target,
    };
    let mut values = Vec::with_capacity(grid.width * grid.height);
    for row in 0..grid.height {
        for col in 0..grid.width {
            let (x, y) = grid.cell_center(col, row);
            let (sx, sy) = transform_point(target, from, x, y)?;
            let value = if sx.is_finite() && sy.is_finite() {
                raster.value_at(sx, sy)
            } else {
                None
            };
            values.push(value.unwrap_or(f32::NAN));
        }
    }
    Raster::new(grid.width, grid.height, grid.bounds, target, values)
}

/// Nearest-cell values of `raster` at every WGS84 point, `None` where the
/// point falls outside the grid or on no-data.
pub fn sample(raster: &Raster, points: &[LonLat]) -> Result<Vec<Option<f64>>, RasterError> {
    points
        .iter()
        .map(|p| {
            let (x, y) = transform_point(Crs::Wgs84, raster.crs(), p.lon(), p.lat())?;
            Ok(raster.value_at(x, y).map(f64::from))
        })
        .collect()
}

/// Replaces no-data cells with the mean of the valid cells in the
/// `window x window` neighbourhood around them.
///
/// Neighbourhoods are read from the unfilled grid, so filled cells never feed
/// other fills. Cells without any valid neighbour stay no-data.
pub fn fill_gaps(raster: &Raster, window: usize) -> Result<Raster, RasterError> {
    if window < 3 || window % 2 == 0 {
        return Err(RasterError::InvalidWindow(window));
    }
    let half = window / 2;
    let width = raster.width();
    let height = raster.height();
    let source = raster.values();
    let mut filled = source.to_vec();

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            if !source[idx].is_nan() {
                continue;
            }
            let mut sum = 0.0f64;
            let mut count = 0usize;
            for r in row.saturating_sub(half)..=(row + half).min(height - 1) {
                for c in col.saturating_sub(half)..=(col + half).min(width - 1) {
                    let v = source[r * width + c];
                    if !v.is_nan() {
                        sum += v as f64;
                        count += 1;
                    }
                }
            }
            if count > 0 {
                filled[idx] = (sum / count as f64) as f32;
            }
        }
    }
    Raster::new(width, height, raster.bounds(), raster.crs(), filled)
}

/// Collapses `frames` into one frame per non-empty bucket of `rule`, dated by
/// the bucket start and in ascending order.
///
/// All frames must share one grid.
pub fn aggregate_time(
    frames: &[Frame],
    rule: &BucketRule,
    reducer: Reducer,
) -> Result<Vec<Frame>, RasterError> {
    let Some(first) = frames.first() else {
        return Ok(Vec::new());
    };
    let mut buckets: BTreeMap<_, Vec<&Raster>> = BTreeMap::new();
    for frame in frames {
        if !frame.raster.same_grid(&first.raster) {
            return Err(RasterError::GridMismatch(frame.date));
        }
        buckets
            .entry(rule.bucket_start(frame.date))
            .or_default()
            .push(&frame.raster);
    }

    let template = &first.raster;
    let cells = template.width() * template.height();
    let mut result = Vec::with_capacity(buckets.len());
    let mut cell_values = Vec::new();
    for (start, rasters) in buckets {
        let mut values = Vec::with_capacity(cells);
        for idx in 0..cells {
            cell_values.clear();
            cell_values.extend(rasters.iter().map(|r| r.values()[idx]));
            values.push(reducer.reduce(&cell_values));
        }
        let raster = Raster::new(
            template.width(),
            template.height(),
            template.bounds(),
            template.crs(),
            values,
        )?;
        result.push(Frame::new(start, raster));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::constant_raster;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mean_mosaic_of_overlapping_tiles() -> Result<(), RasterError> {
        let bounds = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let a = constant_raster(bounds, 10, 10.0);
        let b = constant_raster(bounds, 10, 20.0);
        let merged = mosaic(&[a, b], Reducer::Mean)?;
        assert_eq!(merged.width(), 10);
        assert!(merged.values().iter().all(|v| (*v - 15.0).abs() < 1e-6));
        Ok(())
    }

    #[test]
    fn test_mosaic_of_adjacent_tiles_covers_both() -> Result<(), RasterError> {
        let west = constant_raster(Bounds::new(0.0, 0.0, 1.0, 1.0), 4, 1.0);
        let east = constant_raster(Bounds::new(1.0, 0.0, 2.0, 1.0), 4, 2.0);
        let merged = mosaic(&[west, east], Reducer::Mean)?;
        assert_eq!((merged.width(), merged.height()), (8, 4));
        assert_eq!(merged.value_at(0.5, 0.5), Some(1.0));
        assert_eq!(merged.value_at(1.5, 0.5), Some(2.0));
        Ok(())
    }

    #[test]
    fn test_mosaic_rejects_mixed_crs() {
        let a = constant_raster(Bounds::new(0.0, 0.0, 1.0, 1.0), 2, 1.0);
        let b = reproject(&a, Crs::WebMercator).unwrap();
        assert!(matches!(
            mosaic(&[a, b], Reducer::Mean),
            Err(RasterError::CrsMismatch { .. })
        ));
    }

    #[test]
    fn test_clip_snaps_to_source_grid() -> Result<(), RasterError> {
        let raster = constant_raster(Bounds::new(0.0, 0.0, 1.0, 1.0), 10, 3.0);
        let clipped = clip(&raster, &Bounds::new(0.25, 0.25, 0.75, 0.75))?;
        assert_eq!((clipped.width(), clipped.height()), (6, 6));
        let b = clipped.bounds();
        assert!((b.min_x - 0.2).abs() < 1e-9);
        assert!((b.max_x - 0.8).abs() < 1e-9);
        assert!((b.min_y - 0.2).abs() < 1e-9);
        assert!((b.max_y - 0.8).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_clip_never_extends_past_the_source() -> Result<(), RasterError> {
        let raster = constant_raster(Bounds::new(0.0, 0.0, 1.0, 1.0), 4, 3.0);
        let clipped = clip(&raster, &Bounds::new(0.5, 0.5, 5.0, 5.0))?;
        assert_eq!(clipped.bounds(), Bounds::new(0.5, 0.5, 1.0, 1.0));
        assert!(matches!(
            clip(&raster, &Bounds::new(2.0, 2.0, 3.0, 3.0)),
            Err(RasterError::NoOverlap(_))
        ));
        Ok(())
    }

    #[test]
    fn test_reproject_round_trip_keeps_values() -> Result<(), RasterError> {
        let raster = constant_raster(Bounds::new(5.0, 45.0, 6.0, 46.0), 8, 7.0);
        let mercator = reproject(&raster, Crs::WebMercator)?;
        assert_eq!(mercator.crs(), Crs::WebMercator);
        let back = reproject(&mercator, Crs::Wgs84)?;
        let b = back.bounds();
        assert!((b.min_x - 5.0).abs() < 1e-6 && (b.max_y - 46.0).abs() < 1e-6);
        assert!(back.values().iter().all(|v| *v == 7.0));
        assert!(matches!(
            reproject(&raster, Crs::Epsg(32632)),
            Err(RasterError::UnsupportedCrs { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_sinusoidal_round_trip() -> Result<(), RasterError> {
        for (lon, lat) in [(5.5, 45.5), (-120.0, -33.0), (0.0, 0.0)] {
            let (x, y) = transform_point(Crs::Wgs84, Crs::Sinusoidal, lon, lat)?;
            let (back_lon, back_lat) = transform_point(Crs::Sinusoidal, Crs::Wgs84, x, y)?;
            assert!((back_lon - lon).abs() < 1e-9 && (back_lat - lat).abs() < 1e-9);
        }
        // Top-left corner of MODIS tile h18v04
        let (lon, lat) = transform_point(Crs::Sinusoidal, Crs::Wgs84, 0.0, 5_559_752.598)?;
        assert!(lon.abs() < 1e-9 && (lat - 50.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_sinusoidal_tile_reprojects_to_a_sheared_footprint() -> Result<(), RasterError> {
        let (min_x, min_y) = transform_point(Crs::Wgs84, Crs::Sinusoidal, 5.0, 45.0)?;
        let (max_x, _) = transform_point(Crs::Wgs84, Crs::Sinusoidal, 6.0, 45.0)?;
        let (_, max_y) = transform_point(Crs::Wgs84, Crs::Sinusoidal, 5.0, 46.0)?;
        let tile = Raster::filled(
            20,
            20,
            Bounds::new(min_x, min_y, max_x, max_y),
            Crs::Sinusoidal,
            3.0,
        )?;

        let lon_lat = reproject(&tile, Crs::Wgs84)?;
        let b = lon_lat.bounds();
        // The northern edge reaches further east than the corners alone show
        assert!((b.min_x - 5.0).abs() < 1e-6);
        assert!(b.max_x > 6.1 && b.max_x < 6.11);
        assert!((b.min_y - 45.0).abs() < 1e-6 && (b.max_y - 46.0).abs() < 1e-6);
        assert_eq!(lon_lat.value_at(5.5, 45.5), Some(3.0));
        assert_eq!(lon_lat.value_at(5.02, 45.95), None);
        assert_eq!(lon_lat.value_at(6.05, 45.05), None);
        Ok(())
    }

    #[test]
    fn test_covering_grid_snaps_to_the_first_lattice() -> Result<(), RasterError> {
        let west = constant_raster(Bounds::new(0.0, 0.0, 1.0, 1.0), 4, 1.0);
        let east = constant_raster(Bounds::new(1.0, 0.0, 2.0, 1.0), 4, 2.0);
        let grid = covering_grid([&west, &east], Some(&Bounds::new(0.1, 0.1, 1.9, 0.6)))?;
        assert_eq!((grid.width, grid.height), (8, 3));
        assert_eq!(grid.bounds, Bounds::new(0.0, 0.0, 2.0, 0.75));

        let only_west = mosaic_onto(&[west], &grid, Reducer::Mean)?;
        assert_eq!(only_west.get(0, 0), Some(1.0));
        assert_eq!(only_west.get(7, 0), None);
        Ok(())
    }

    #[test]
    fn test_sample_outside_is_none() -> Result<(), RasterError> {
        let raster = constant_raster(Bounds::new(0.0, 0.0, 1.0, 1.0), 4, 9.0);
        let values = sample(&raster, &[LonLat(0.5, 0.5), LonLat(3.0, 3.0)])?;
        assert_eq!(values, vec![Some(9.0), None]);
        Ok(())
    }

    #[test]
    fn test_fill_gaps_only_replaces_missing_cells() -> Result<(), RasterError> {
        let raster = Raster::new(
            3,
            3,
            Bounds::new(0.0, 0.0, 3.0, 3.0),
            Crs::Wgs84,
            vec![1.0, 2.0, 3.0, 4.0, f32::NAN, 6.0, 7.0, 8.0, 9.0],
        )?;
        let filled = fill_gaps(&raster, 3)?;
        assert_eq!(filled.get(1, 1), Some(5.0));
        assert_eq!(filled.get(0, 0), Some(1.0));
        assert!(matches!(
            fill_gaps(&raster, 4),
            Err(RasterError::InvalidWindow(4))
        ));
        assert!(matches!(
            fill_gaps(&raster, 1),
            Err(RasterError::InvalidWindow(1))
        ));
        Ok(())
    }

    #[test]
    fn test_monthly_aggregation_of_eight_day_frames() -> Result<(), RasterError> {
        let bounds = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let mut frames = Vec::new();
        let mut day = date(2025, 1, 1);
        for i in 0..9 {
            frames.push(Frame::new(day, constant_raster(bounds, 2, i as f32)));
            day += chrono::Duration::days(8);
        }
        assert_eq!(frames.last().map(|f| f.date), Some(date(2025, 3, 6)));

        let monthly = aggregate_time(&frames, &BucketRule::Month, Reducer::Mean)?;
        let dates: Vec<_> = monthly.iter().map(|f| f.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 1, 1), date(2025, 2, 1), date(2025, 3, 1)]
        );
        // January holds frames 0..=3 (01-01, 01-09, 01-17, 01-25)
        assert_eq!(monthly[0].raster.get(0, 0), Some(1.5));
        Ok(())
    }

    #[test]
    fn test_aggregating_nothing_yields_nothing() -> Result<(), RasterError> {
        assert!(aggregate_time(&[], &BucketRule::Year, Reducer::Mean)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_reducers_skip_missing_values() {
        let values = [1.0, f32::NAN, 3.0];
        assert_eq!(Reducer::Mean.reduce(&values), 2.0);
        assert_eq!(Reducer::Sum.reduce(&values), 4.0);
        assert_eq!(Reducer::Min.reduce(&values), 1.0);
        assert_eq!(Reducer::Max.reduce(&values), 3.0);
        assert!(Reducer::Mean.reduce(&[f32::NAN]).is_nan());
        assert_eq!("MAX".parse::<Reducer>().unwrap(), Reducer::Max);
    }
}
