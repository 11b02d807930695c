use crate::processing::aggregation::BucketRule;
use crate::raster::error::RasterError;
use crate::raster::frame::{Bounds, Crs, Frame, Grid, Raster};
use crate::raster::geotiff;
use crate::raster::ops::{self, Reducer};
use crate::types::extent::LonLat;
use log::debug;
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Raster capabilities the pipeline relies on.
///
/// Only [`RasterEngine::open`] has to be provided; every other operation
/// defaults to the crate's grid algorithms in [`crate::raster::ops`].
pub trait RasterEngine {
    /// Opens the raster at `uri`, either an `http(s)` URL or a local path.
    fn open(&self, uri: &str) -> Result<Raster, RasterError>;

    fn clip(&self, raster: &Raster, bounds: &Bounds) -> Result<Raster, RasterError> {
        ops::clip(raster, bounds)
    }

    fn mosaic(&self, rasters: &[Raster], reducer: Reducer) -> Result<Raster, RasterError> {
        ops::mosaic(rasters, reducer)
    }

    /// Resamples `rasters` onto a grid chosen by the caller.
    fn mosaic_onto(
        &self,
        rasters: &[Raster],
        grid: &Grid,
        reducer: Reducer,
    ) -> Result<Raster, RasterError> {
        ops::mosaic_onto(rasters, grid, reducer)
    }

    fn reproject(&self, raster: &Raster, target: Crs) -> Result<Raster, RasterError> {
        ops::reproject(raster, target)
    }

    fn sample(&self, raster: &Raster, points: &[LonLat]) -> Result<Vec<Option<f64>>, RasterError> {
        ops::sample(raster, points)
    }

    fn aggregate_time(
        &self,
        frames: &[Frame],
        rule: &BucketRule,
        reducer: Reducer,
    ) -> Result<Vec<Frame>, RasterError> {
        ops::aggregate_time(frames, rule, reducer)
    }

    fn fill_gaps(&self, raster: &Raster, window: usize) -> Result<Raster, RasterError> {
        ops::fill_gaps(raster, window)
    }
}

/// The default engine: GeoTIFFs over HTTP or from disk into in-memory grids.
pub struct GridEngine {
    client: Client,
}

impl GridEngine {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn open_url(&self, url: &str) -> Result<Raster, RasterError> {
        debug!("Streaming raster from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RasterError::NetworkRequest(url.to_string(), e))?;
        let status = response.status();
        let response = response
            .error_for_status()
            .map_err(|e| RasterError::HttpStatus {
                url: url.to_string(),
                status,
                source: e,
            })?;
        let bytes = response
            .bytes()
            .map_err(|e| RasterError::NetworkRequest(url.to_string(), e))?;
        geotiff::decode(Cursor::new(bytes))
    }

    fn open_file(&self, path: &Path) -> Result<Raster, RasterError> {
        debug!("Reading raster from {}", path.display());
        let file = File::open(path).map_err(|e| RasterError::FileRead(path.to_path_buf(), e))?;
        geotiff::decode(BufReader::new(file))
    }
}

impl RasterEngine for GridEngine {
    fn open(&self, uri: &str) -> Result<Raster, RasterError> {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            self.open_url(uri)
        } else {
            let path = uri.strip_prefix("file://").unwrap_or(uri);
            self.open_file(Path::new(path))
        }
    }
}
