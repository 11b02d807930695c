use crate::raster::error::RasterError;
use crate::raster::stack::StackError;
use chrono::NaiveDate;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Gap filling failed for the frame dated {date}")]
    GapFill {
        date: NaiveDate,
        #[source]
        source: RasterError,
    },

    #[error("Temporal aggregation failed")]
    Aggregation(#[source] RasterError),

    #[error("Sampling failed for the frame dated {date}")]
    Sampling {
        date: NaiveDate,
        #[source]
        source: RasterError,
    },

    #[error("Cropping failed for the frame dated {date}")]
    Crop {
        date: NaiveDate,
        #[source]
        source: RasterError,
    },

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error("Failed to build the point table")]
    Table(#[from] PolarsError),

    #[error("Failed to create output file '{0}'")]
    FileCreate(PathBuf, #[source] std::io::Error),

    #[error("Failed to write table to '{0}'")]
    TableWrite(PathBuf, #[source] PolarsError),
}
