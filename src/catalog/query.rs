use crate::catalog::error::QueryError;
use crate::catalog::{CatalogClient, SearchRequest};
use crate::fetch::retry::RetryingFetcher;
use crate::types::descriptor::{TileDescriptor, TileFailure};
use log::{debug, info, warn};

/// Finds the tiles of a search and makes sure each one can be read.
pub struct TileQuery<'a> {
    catalog: &'a dyn CatalogClient,
    fetcher: &'a RetryingFetcher<'a>,
}

impl<'a> TileQuery<'a> {
    pub fn new(catalog: &'a dyn CatalogClient, fetcher: &'a RetryingFetcher<'a>) -> Self {
        Self { catalog, fetcher }
    }

    /// Runs the search, resolves every asset locator and preflight-checks it.
    ///
    /// The returned tiles carry resolved (signed) hrefs, in catalog order.
    ///
    /// # Errors
    ///
    /// * [`QueryError::Search`] when the search keeps failing.
    /// * [`QueryError::NoDataFound`] when it matches nothing.
    /// * [`QueryError::UnreachableAssets`] listing every asset whose href could
    ///   not be resolved or that failed its preflight check.
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<TileDescriptor>, QueryError> {
        let description = format!("searching '{}'", request.collection_id);
        let tiles = self
            .fetcher
            .attempt(&description, || self.catalog.search(request))
            .map_err(QueryError::Search)?;
        if tiles.is_empty() {
            return Err(QueryError::NoDataFound {
                collection: request.collection_id.clone(),
                extent: request.extent,
                time_range: request
                    .time_range
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "(any)".to_string()),
            });
        }
        info!(
            "Found {} tiles of '{}'",
            tiles.len(),
            request.collection_id
        );

        let total = tiles.len();
        let mut failures = Vec::new();
        let mut resolved = Vec::with_capacity(total);
        for tile in tiles {
            let description = format!("resolving {} {}", tile.acquisition_date, tile.tile_id);
            let signed = self.fetcher.attempt(&description, || {
                self.catalog.resolve_asset_locator(&tile.asset_href)
            });
            match signed {
                Ok(href) => resolved.push(TileDescriptor {
                    asset_href: href,
                    ..tile
                }),
                Err(e) => failures.push(TileFailure::new(&tile, &e)),
            }
        }

        for tile in &resolved {
            let description = format!("checking {} {}", tile.acquisition_date, tile.tile_id);
            match self
                .fetcher
                .attempt(&description, || self.catalog.check_asset(&tile.asset_href))
            {
                Ok(()) => debug!("Asset {} {} is reachable", tile.acquisition_date, tile.tile_id),
                Err(e) => failures.push(TileFailure::new(tile, &e)),
            }
        }
        if !failures.is_empty() {
            warn!("{} of {} assets are unreachable", failures.len(), total);
            return Err(QueryError::UnreachableAssets(failures));
        }
        Ok(resolved)
    }
}
