//! Turning matched tiles into a date-ordered stack of mosaicked frames.

use crate::assembly::error::AssemblyError;
use crate::catalog::CatalogClient;
use crate::fetch::retry::RetryingFetcher;
use crate::raster::engine::RasterEngine;
use crate::raster::error::RasterError;
use crate::raster::frame::{Bounds, Crs, Frame, Raster};
use crate::raster::ops::{self, Reducer};
use crate::raster::stack::RasterStack;
use crate::types::descriptor::{TileDescriptor, TileFailure};
use crate::types::extent::SpatialExtent;
use crate::utils::ScratchDir;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::error::Error as StdError;

/// A tile together with its opened raster, already in EPSG:4326 and, when
/// cropping, clipped to the requested extent.
#[derive(Debug, Clone)]
pub struct OpenedTile {
    pub tile: TileDescriptor,
    /// `None` when the tile does not overlap the extent.
    pub raster: Option<Raster>,
}

/// Opens tiles and mosaics them into one frame per acquisition date.
pub struct TileAssembler<'a> {
    engine: &'a dyn RasterEngine,
    catalog: &'a dyn CatalogClient,
    fetcher: &'a RetryingFetcher<'a>,
    scratch: Option<&'a ScratchDir>,
    crop: bool,
}

impl<'a> TileAssembler<'a> {
    /// With a `scratch` directory, tiles are downloaded into it before being
    /// opened; otherwise they are streamed from their href.
    pub fn new(
        engine: &'a dyn RasterEngine,
        catalog: &'a dyn CatalogClient,
        fetcher: &'a RetryingFetcher<'a>,
        scratch: Option<&'a ScratchDir>,
        crop: bool,
    ) -> Self {
        Self {
            engine,
            catalog,
            fetcher,
            scratch,
            crop,
        }
    }

    fn open_tile(&self, tile: &TileDescriptor) -> Result<Raster, Box<dyn StdError>> {
        let label = format!("{} {}", tile.acquisition_date, tile.tile_id);
        let uri = match self.scratch {
            Some(scratch) => {
                let path = scratch.obtain(&tile.file_name(), |target| {
                    self.fetcher
                        .attempt(&format!("downloading {}", label), || {
                            self.catalog.download_asset(&tile.asset_href, target)
                        })
                        .map(|_| ())
                })?;
                path.to_string_lossy().into_owned()
            }
            None => tile.asset_href.clone(),
        };
        let raster = self
            .fetcher
            .attempt(&format!("opening {}", label), || self.engine.open(&uri))?;
        Ok(raster)
    }

    fn clip_overlap(&self, raster: &Raster, bounds: &Bounds) -> Result<Option<Raster>, RasterError> {
        match self.engine.clip(raster, bounds) {
            Ok(clipped) => Ok(Some(clipped)),
            Err(RasterError::NoOverlap(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Brings an opened raster into EPSG:4326, cut down to `bounds` when
    /// cropping.
    fn prepare(&self, raster: Raster, bounds: &Bounds) -> Result<Option<Raster>, RasterError> {
        let native = raster.crs();
        if !self.crop {
            return match native {
                Crs::Wgs84 => Ok(Some(raster)),
                _ => self.engine.reproject(&raster, Crs::Wgs84).map(Some),
            };
        }
        if native == Crs::Wgs84 {
            return self.clip_overlap(&raster, bounds);
        }
        // Cut in the native CRS first, one cell wider, so only the cells
        // needed get reprojected.
        let local = ops::transform_bounds(bounds, Crs::Wgs84, native)?;
        let (x_res, y_res) = raster.resolution();
        let padded = Bounds::new(
            local.min_x - x_res,
            local.min_y - y_res,
            local.max_x + x_res,
            local.max_y + y_res,
        );
        let Some(piece) = self.clip_overlap(&raster, &padded)? else {
            return Ok(None);
        };
        drop(raster);
        let reprojected = self.engine.reproject(&piece, Crs::Wgs84)?;
        self.clip_overlap(&reprojected, bounds)
    }

    /// Opens every tile under the retry policy and prepares it for `extent`.
    ///
    /// Only the part of each tile that is needed is kept in memory.
    ///
    /// # Errors
    ///
    /// * [`AssemblyError::UnopenableTiles`] listing every tile that could not
    ///   be opened, once all of them were tried.
    /// * [`AssemblyError::Tile`] when an opened tile cannot be reprojected or
    ///   clipped.
    pub fn open_tiles(
        &self,
        tiles: &[TileDescriptor],
        extent: &SpatialExtent,
    ) -> Result<Vec<OpenedTile>, AssemblyError> {
        let bounds = Bounds::from(*extent);
        let mut opened = Vec::with_capacity(tiles.len());
        let mut failures = Vec::new();
        for tile in tiles {
            let raster = match self.open_tile(tile) {
                Ok(raster) => raster,
                Err(e) => {
                    failures.push(TileFailure::new(tile, e.as_ref()));
                    continue;
                }
            };
            debug!(
                "Opened {} {} ({}x{}, {})",
                tile.acquisition_date,
                tile.tile_id,
                raster.width(),
                raster.height(),
                raster.crs()
            );
            let prepared = self
                .prepare(raster, &bounds)
                .map_err(|source| AssemblyError::Tile {
                    date: tile.acquisition_date,
                    tile_id: tile.tile_id.clone(),
                    source,
                })?;
            if prepared.is_none() {
                debug!(
                    "Tile {} {} does not overlap {}",
                    tile.acquisition_date, tile.tile_id, extent
                );
            }
            opened.push(OpenedTile {
                tile: tile.clone(),
                raster: prepared,
            });
        }
        if !failures.is_empty() {
            warn!("{} of {} tiles could not be opened", failures.len(), tiles.len());
            return Err(AssemblyError::UnopenableTiles(failures));
        }
        info!("Opened {} tiles", opened.len());
        Ok(opened)
    }

    /// Groups opened tiles by date and builds one frame per date.
    ///
    /// All frames share one grid: the union of the tiles, trimmed to `extent`
    /// when cropping, on the lattice of the first tile. Groups are
    /// mean-mosaicked onto it in the order they were queried; a lone tile that
    /// already fills the grid is used as is.
    ///
    /// # Errors
    ///
    /// * [`AssemblyError::NoCoverage`] when no tile of a date overlaps
    ///   `extent`.
    /// * [`AssemblyError::Grid`] when the tiles cannot share a grid.
    pub fn assemble_opened(
        &self,
        opened: Vec<OpenedTile>,
        extent: &SpatialExtent,
    ) -> Result<RasterStack, AssemblyError> {
        let mut groups: BTreeMap<NaiveDate, Vec<Raster>> = BTreeMap::new();
        for OpenedTile { tile, raster } in opened {
            groups
                .entry(tile.acquisition_date)
                .or_default()
                .extend(raster);
        }
        if let Some((date, _)) = groups.iter().find(|(_, rasters)| rasters.is_empty()) {
            return Err(AssemblyError::NoCoverage(*date));
        }
        if groups.is_empty() {
            return Ok(RasterStack::new(Vec::new())?);
        }

        let within = self.crop.then(|| Bounds::from(*extent));
        let grid = ops::covering_grid(groups.values().flatten(), within.as_ref())
            .map_err(AssemblyError::Grid)?;
        debug!(
            "Stack grid is {}x{} over {:?}",
            grid.width, grid.height, grid.bounds
        );

        let mut frames = Vec::with_capacity(groups.len());
        for (date, mut rasters) in groups {
            let raster = match rasters.pop() {
                Some(only) if rasters.is_empty() && only.grid().matches(&grid) => only,
                Some(last) => {
                    rasters.push(last);
                    debug!("Mosaicking {} tiles dated {}", rasters.len(), date);
                    self.engine
                        .mosaic_onto(&rasters, &grid, Reducer::Mean)
                        .map_err(|source| AssemblyError::Mosaic { date, source })?
                }
                None => return Err(AssemblyError::NoCoverage(date)),
            };
            frames.push(Frame::new(date, raster));
        }
        Ok(RasterStack::new(frames)?)
    }

    /// [`Self::open_tiles`] followed by [`Self::assemble_opened`].
    pub fn assemble(
        &self,
        tiles: &[TileDescriptor],
        extent: &SpatialExtent,
    ) -> Result<RasterStack, AssemblyError> {
        let opened = self.open_tiles(tiles, extent)?;
        self.assemble_opened(opened, extent)
    }
}
