use crate::assembly::error::AssemblyError;
use crate::catalog::error::{QueryError, ResolutionError};
use crate::processing::error::ProcessError;
use crate::types::extent::SpatialExtent;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Pipeline failed while {stage}")]
    Pipeline {
        stage: PipelineStage,
        #[source]
        source: StageError,
    },

    #[error("Failed to build the HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to create download directory '{0}'")]
    DownloadDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    #[error("Failed to read config file '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    ConfigParse(PathBuf, #[source] serde_json::Error),
}

impl HarvestError {
    /// The stage a pipeline failure happened in.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            HarvestError::Pipeline { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Bad caller input, detected before any network access.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid extent [{west}, {south}, {east}, {north}]: {reason}")]
    InvalidExtent {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        reason: &'static str,
    },

    #[error("Invalid coordinate ({lon}, {lat}): longitude must lie in [-180, 180] and latitude in [-90, 90]")]
    InvalidCoordinate { lon: f64, lat: f64 },

    #[error("At least one point is required")]
    EmptyPointSet,

    #[error("Failed to parse date input")]
    DateParsing,

    #[error("Time range starts at {start}, after its end {end}")]
    InvalidTimeRange { start: NaiveDate, end: NaiveDate },

    #[error("{data_source} requires a time range")]
    MissingTimeRange { data_source: String },

    #[error("{data_source} requires a variable")]
    MissingVariable { data_source: String },

    #[error("Unknown aggregation level '{0}', expected year, month, week or a day count like '8d'")]
    InvalidAggregation(String),

    #[error("Gap-fill window must be an odd number of at least 3, got {0}")]
    InvalidGapfillWindow(usize),

    #[error("Retry policy needs at least one attempt")]
    InvalidRetryPolicy,

    #[error("Extent {extent} lies outside the coverage {domain} of {data_source}")]
    OutsideDomain {
        data_source: String,
        extent: SpatialExtent,
        domain: SpatialExtent,
    },

    #[error("Point ({lon}, {lat}) lies outside the coverage {domain} of {data_source}")]
    PointOutsideDomain {
        data_source: String,
        lon: f64,
        lat: f64,
        domain: SpatialExtent,
    },
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ResolvingCollection,
    Querying,
    Fetching,
    Assembling,
    PostProcessing,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::ResolvingCollection => "resolving the collection",
            PipelineStage::Querying => "querying the catalog",
            PipelineStage::Fetching => "fetching tiles",
            PipelineStage::Assembling => "assembling frames",
            PipelineStage::PostProcessing => "post-processing",
        };
        f.write_str(name)
    }
}

/// The component failure behind a [`HarvestError::Pipeline`].
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Process(#[from] ProcessError),
}
