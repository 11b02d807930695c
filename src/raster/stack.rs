use crate::raster::error::RasterError;
use crate::raster::frame::Frame;
use crate::raster::geotiff;
use chrono::NaiveDate;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackError {
    #[error("Frame dated {next} follows {previous}; frames must be in strictly increasing date order")]
    OutOfOrder { previous: NaiveDate, next: NaiveDate },

    #[error("More than one frame dated {0}")]
    DuplicateDate(NaiveDate),
}

/// Frames ordered by strictly increasing date, one per date.
///
/// ```
/// use chrono::NaiveDate;
/// use rasterharvest::{Bounds, Crs, Frame, Raster, RasterStack};
///
/// let grid = Raster::filled(1, 1, Bounds::new(0.0, 0.0, 1.0, 1.0), Crs::Wgs84, 1.0).unwrap();
/// let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
///
/// let stack = RasterStack::from_unordered(vec![
///     Frame::new(day(9), grid.clone()),
///     Frame::new(day(1), grid.clone()),
/// ])
/// .unwrap();
/// assert_eq!(stack.dates(), vec![day(1), day(9)]);
///
/// assert!(RasterStack::new(vec![Frame::new(day(9), grid.clone()), Frame::new(day(1), grid)]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RasterStack {
    frames: Vec<Frame>,
}

impl RasterStack {
    /// Wraps frames that are already in strictly increasing date order.
    pub fn new(frames: Vec<Frame>) -> Result<Self, StackError> {
        for pair in frames.windows(2) {
            let (previous, next) = (pair[0].date, pair[1].date);
            if previous == next {
                return Err(StackError::DuplicateDate(next));
            }
            if previous > next {
                return Err(StackError::OutOfOrder { previous, next });
            }
        }
        Ok(Self { frames })
    }

    /// Sorts `frames` by date. Duplicated dates are still rejected.
    pub fn from_unordered(mut frames: Vec<Frame>) -> Result<Self, StackError> {
        frames.sort_by_key(|f| f.date);
        Self::new(frames)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.frames.iter().map(|f| f.date).collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Frame> {
        self.frames
            .binary_search_by_key(&date, |f| f.date)
            .ok()
            .map(|idx| &self.frames[idx])
    }

    /// Writes every frame to `dir` as `{prefix}_{YYYY-MM-DD}.tif`, creating
    /// the directory if needed. Returns the written paths in date order.
    pub fn write_geotiffs(&self, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, RasterError> {
        std::fs::create_dir_all(dir).map_err(|e| RasterError::FileWrite(dir.to_path_buf(), e))?;
        let mut written = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            let path = dir.join(format!("{}_{}.tif", prefix, frame.date.format("%Y-%m-%d")));
            let file = File::create(&path).map_err(|e| RasterError::FileWrite(path.clone(), e))?;
            geotiff::encode(&frame.raster, BufWriter::new(file))?;
            written.push(path);
        }
        info!("Wrote {} frames to {}", written.len(), dir.display());
        Ok(written)
    }
}
