pub mod assembly;
pub mod catalog;
mod clients;
mod config;
mod error;
pub mod fetch;
mod harvester;
pub mod processing;
pub mod raster;
mod sources;
#[cfg(test)]
mod testing;
mod types;
mod utils;

pub use config::*;
pub use error::*;
pub use harvester::*;
pub use sources::*;

pub use clients::collection_client::*;
pub use clients::dem_client::*;
pub use clients::land_cover_client::*;
pub use clients::modis_client::*;

pub use types::descriptor::*;
pub use types::extent::*;
pub use types::time_range::TimeRange;
pub use types::traits::any_date::AnyDate;
pub use types::traits::types::Month;
pub use types::traits::types::Year;

pub use catalog::naming::NamingConvention;
pub use catalog::resolver::Resolution;
pub use catalog::stac::StacCatalog;
pub use catalog::{CatalogClient, SearchRequest};
pub use fetch::retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use processing::aggregation::BucketRule;
pub use processing::extraction::PointTable;
pub use processing::post_processor::ExtractionResult;
pub use raster::engine::{GridEngine, RasterEngine};
pub use raster::frame::{Bounds, Crs, Frame, Grid, Raster};
pub use raster::ops::Reducer;
pub use raster::stack::RasterStack;
pub use utils::{get_cache_dir, ScratchDir};
