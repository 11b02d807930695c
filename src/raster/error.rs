use crate::fetch::retry::Transient;
use crate::raster::frame::{Bounds, Crs};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read raster file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write raster file '{0}'")]
    FileWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode or encode GeoTIFF")]
    Tiff(#[from] tiff::TiffError),

    #[error("GeoTIFF carries no georeferencing (model tiepoint and pixel scale)")]
    MissingGeoreference,

    #[error("Unsupported raster layout: {0}")]
    UnsupportedLayout(String),

    #[error("Grid of {width}x{height} does not match {cells} cell values")]
    SizeMismatch {
        width: usize,
        height: usize,
        cells: usize,
    },

    #[error("Raster bounds {0:?} are empty")]
    DegenerateBounds(Bounds),

    #[error("Cannot transform between {from} and {to}")]
    UnsupportedCrs { from: Crs, to: Crs },

    #[error("Rasters do not share a CRS: expected {expected}, found {found}")]
    CrsMismatch { expected: Crs, found: Crs },

    #[error("Raster does not overlap {0:?}")]
    NoOverlap(Bounds),

    #[error("Cannot mosaic an empty set of rasters")]
    EmptyMosaic,

    #[error("Frame dated {0} does not share the grid of the first frame")]
    GridMismatch(NaiveDate),

    #[error("Gap-fill window must be an odd number of at least 3, got {0}")]
    InvalidWindow(usize),

    #[error("Unknown reducer '{0}', expected one of mean, sum, min, max")]
    UnknownReducer(String),
}

impl Transient for RasterError {
    fn is_transient(&self) -> bool {
        match self {
            RasterError::NetworkRequest(_, e) => e.is_timeout() || e.is_connect() || e.is_body(),
            RasterError::HttpStatus { status, .. } => {
                status.is_server_error()
                    || *status == reqwest::StatusCode::REQUEST_TIMEOUT
                    || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}
