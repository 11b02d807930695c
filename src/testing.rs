//! In-memory stand-ins for the catalog, the raster engine and the sleeper.

use crate::catalog::error::CatalogError;
use crate::catalog::{CatalogClient, SearchRequest};
use crate::fetch::retry::Sleeper;
use crate::raster::engine::RasterEngine;
use crate::raster::error::RasterError;
use crate::raster::frame::{Bounds, Crs, Raster};
use crate::raster::geotiff;
use crate::types::descriptor::{CollectionDescriptor, TileDescriptor};
use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Records requested delays instead of sleeping. Clones share the record.
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    delays: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.delays.borrow_mut().push(duration);
    }
}

/// A real, transient connection failure.
pub fn connect_error(url: &str) -> CatalogError {
    let error = reqwest::blocking::Client::new()
        .get("http://127.0.0.1:1/")
        .send()
        .expect_err("nothing listens on port 1");
    CatalogError::NetworkRequest(url.to_string(), error)
}

/// A real `error_for_status` failure carrying `code`.
pub fn status_error(code: u16) -> reqwest::Error {
    let response = http::Response::builder()
        .status(code)
        .body("")
        .expect("valid status");
    reqwest::blocking::Response::from(response)
        .error_for_status()
        .expect_err("status is an error")
}

fn strip_query(uri: &str) -> &str {
    uri.split('?').next().unwrap_or(uri)
}

#[derive(Debug, Default)]
pub struct MockCatalog {
    collections: Vec<CollectionDescriptor>,
    tiles: Vec<TileDescriptor>,
    assets: HashMap<String, Raster>,
    unreachable: HashSet<String>,
    unsignable: HashSet<String>,
    failing_searches: Cell<usize>,
    list_calls: Cell<usize>,
    search_calls: Cell<usize>,
    download_calls: Cell<usize>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collections(mut self, collections: Vec<CollectionDescriptor>) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_tiles(mut self, tiles: Vec<TileDescriptor>) -> Self {
        self.tiles = tiles;
        self
    }

    /// Serves `raster` as a GeoTIFF download for `url`.
    pub fn with_asset(mut self, url: &str, raster: Raster) -> Self {
        self.assets.insert(url.to_string(), raster);
        self
    }

    /// The first `count` searches fail with a connection error.
    pub fn failing_searches(self, count: usize) -> Self {
        self.failing_searches.set(count);
        self
    }

    /// Preflight checks of these (signed) URLs fail.
    pub fn unreachable(mut self, urls: &[&str]) -> Self {
        self.unreachable = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    /// Signing these hrefs is refused.
    pub fn unsignable(mut self, hrefs: &[&str]) -> Self {
        self.unsignable = hrefs.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.get()
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.get()
    }
}

impl CatalogClient for MockCatalog {
    fn list_collections(&self) -> Result<Vec<CollectionDescriptor>, CatalogError> {
        self.list_calls.set(self.list_calls.get() + 1);
        Ok(self.collections.clone())
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<TileDescriptor>, CatalogError> {
        self.search_calls.set(self.search_calls.get() + 1);
        if self.failing_searches.get() > 0 {
            self.failing_searches.set(self.failing_searches.get() - 1);
            return Err(connect_error("mock://search"));
        }
        Ok(self
            .tiles
            .iter()
            .filter(|t| {
                request
                    .time_range
                    .map_or(true, |range| range.contains(t.acquisition_date))
            })
            .take(request.limit)
            .cloned()
            .collect())
    }

    fn resolve_asset_locator(&self, href: &str) -> Result<String, CatalogError> {
        if self.unsignable.contains(href) {
            return Err(CatalogError::MalformedResponse {
                url: href.to_string(),
                reason: "signing refused".to_string(),
            });
        }
        Ok(format!("{}?signed", href))
    }

    fn check_asset(&self, url: &str) -> Result<(), CatalogError> {
        if self.unreachable.contains(url) {
            return Err(connect_error(url));
        }
        Ok(())
    }

    fn download_asset(&self, url: &str, destination: &Path) -> Result<u64, CatalogError> {
        self.download_calls.set(self.download_calls.get() + 1);
        let raster = self
            .assets
            .get(strip_query(url))
            .ok_or_else(|| CatalogError::MalformedResponse {
                url: url.to_string(),
                reason: "no such asset".to_string(),
            })?;
        let file = File::create(destination)
            .map_err(|e| CatalogError::FileWrite(destination.to_path_buf(), e))?;
        geotiff::encode(raster, file).map_err(|e| {
            CatalogError::FileWrite(
                destination.to_path_buf(),
                io::Error::new(io::ErrorKind::Other, e.to_string()),
            )
        })?;
        std::fs::metadata(destination)
            .map(|m| m.len())
            .map_err(|e| CatalogError::FileWrite(destination.to_path_buf(), e))
    }
}

/// Lets a test keep a handle on a catalog it hands to a harvester.
impl CatalogClient for Rc<MockCatalog> {
    fn list_collections(&self) -> Result<Vec<CollectionDescriptor>, CatalogError> {
        self.as_ref().list_collections()
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<TileDescriptor>, CatalogError> {
        self.as_ref().search(request)
    }

    fn resolve_asset_locator(&self, href: &str) -> Result<String, CatalogError> {
        self.as_ref().resolve_asset_locator(href)
    }

    fn check_asset(&self, url: &str) -> Result<(), CatalogError> {
        self.as_ref().check_asset(url)
    }

    fn download_asset(&self, url: &str, destination: &Path) -> Result<u64, CatalogError> {
        self.as_ref().download_asset(url, destination)
    }
}

/// Engine serving rasters registered by URI. Query strings are ignored.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    rasters: HashMap<String, Raster>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raster(mut self, uri: &str, raster: Raster) -> Self {
        self.rasters.insert(uri.to_string(), raster);
        self
    }
}

impl RasterEngine for MemoryEngine {
    fn open(&self, uri: &str) -> Result<Raster, RasterError> {
        self.rasters.get(strip_query(uri)).cloned().ok_or_else(|| {
            RasterError::FileRead(
                PathBuf::from(uri),
                io::Error::new(io::ErrorKind::NotFound, "no raster registered"),
            )
        })
    }
}

/// An `n` by `n` WGS84 grid over `bounds` holding `value` everywhere.
pub fn constant_raster(bounds: Bounds, n: usize, value: f32) -> Raster {
    Raster::filled(n, n, bounds, Crs::Wgs84, value).expect("valid grid")
}

pub fn collection(id: &str, variables: &[&str]) -> CollectionDescriptor {
    CollectionDescriptor {
        id: id.to_string(),
        title: None,
        description: None,
        variables: variables.iter().map(|v| v.to_string()).collect(),
    }
}

pub fn tile(date: &str, tile_id: &str, href: &str) -> TileDescriptor {
    TileDescriptor {
        collection_id: "test-collection".to_string(),
        acquisition_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date"),
        tile_id: tile_id.to_string(),
        asset_href: href.to_string(),
    }
}
