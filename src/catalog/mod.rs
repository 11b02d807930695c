//! Catalog access: the [`CatalogClient`] seam, its STAC implementation,
//! collection resolution and tile queries.

pub mod error;
pub mod naming;
pub mod query;
pub mod resolver;
pub mod stac;

use crate::catalog::error::CatalogError;
use crate::catalog::naming::NamingConvention;
use crate::types::descriptor::{CollectionDescriptor, TileDescriptor};
use crate::types::extent::SpatialExtent;
use crate::types::time_range::TimeRange;
use std::path::Path;

/// A spatio-temporal search for the tiles of one collection asset.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub collection_id: String,
    pub extent: SpatialExtent,
    pub time_range: Option<TimeRange>,
    /// Maximum number of tiles to return.
    pub limit: usize,
    /// Key of the asset to take from every matched item.
    pub asset_key: String,
    pub naming: NamingConvention,
}

/// Operations the pipeline needs from a remote catalog.
pub trait CatalogClient {
    /// Every collection the catalog exposes, in catalog order.
    fn list_collections(&self) -> Result<Vec<CollectionDescriptor>, CatalogError>;

    /// Tiles matching `request`, in the order the catalog returned them.
    fn search(&self, request: &SearchRequest) -> Result<Vec<TileDescriptor>, CatalogError>;

    /// Turns an asset href into a URL that can be read directly.
    fn resolve_asset_locator(&self, href: &str) -> Result<String, CatalogError>;

    /// Confirms the asset at `url` can be reached.
    fn check_asset(&self, url: &str) -> Result<(), CatalogError>;

    /// Stores the asset at `url` in `destination`, returning the bytes written.
    fn download_asset(&self, url: &str, destination: &Path) -> Result<u64, CatalogError>;
}
