//! The main entry point: a [`Harvester`] runs the resolve, query, fetch,
//! assemble and post-process pipeline against a catalog and a raster engine.

use crate::assembly::assembler::TileAssembler;
use crate::catalog::query::TileQuery;
use crate::catalog::resolver::{CollectionResolver, Resolution};
use crate::catalog::stac::StacCatalog;
use crate::catalog::{CatalogClient, SearchRequest};
use crate::clients::collection_client::CollectionClient;
use crate::clients::dem_client::DemClient;
use crate::clients::land_cover_client::LandCoverClient;
use crate::clients::modis_client::ModisClient;
use crate::config::{FetchOptions, HarvestConfig};
use crate::error::{HarvestError, PipelineStage, StageError};
use crate::fetch::retry::{RetryingFetcher, Sleeper, ThreadSleeper};
use crate::processing::post_processor::{ExtractionResult, PostProcessor};
use crate::raster::engine::{GridEngine, RasterEngine};
use crate::sources::DataSource;
use crate::types::extent::SpatialQuery;
use crate::types::time_range::TimeRange;
use crate::utils::{get_cache_dir, ScratchDir};
use bon::bon;
use log::{info, warn};
use reqwest::blocking::Client;
use std::path::PathBuf;

/// Client for harvesting raster data from a STAC catalog.
///
/// Create one with [`Harvester::new()`] for the Planetary Computer defaults or
/// [`Harvester::with_config()`] to point it elsewhere. Requests are made
/// through the per-source clients ([`Harvester::dem()`],
/// [`Harvester::modis()`], [`Harvester::land_cover()`],
/// [`Harvester::collection()`]).
///
/// # Examples
///
/// ```no_run
/// use rasterharvest::{Harvester, HarvestError, SpatialExtent};
///
/// # fn main() -> Result<(), HarvestError> {
/// let harvester = Harvester::new()?;
/// let extent = SpatialExtent::new(7.9, 46.4, 8.1, 46.6)?;
/// let stack = harvester.dem().area(extent).call()?.into_stack();
/// # Ok(())
/// # }
/// ```
pub struct Harvester {
    catalog: Box<dyn CatalogClient>,
    engine: Box<dyn RasterEngine>,
    sleeper: Box<dyn Sleeper>,
    config: HarvestConfig,
}

/// Logs stage transitions and tags failures with the stage they happened in.
struct PipelineRun<'a> {
    source: &'a str,
}

impl PipelineRun<'_> {
    fn stage<T, E, F>(&self, stage: PipelineStage, run: F) -> Result<T, HarvestError>
    where
        E: Into<StageError>,
        F: FnOnce() -> Result<T, E>,
    {
        info!("{}: {}", self.source, stage);
        run().map_err(|e| {
            let source = e.into();
            warn!("{}: failed while {}: {}", self.source, stage, source);
            HarvestError::Pipeline { stage, source }
        })
    }
}

#[bon]
impl Harvester {
    /// A harvester using [`HarvestConfig::default()`].
    ///
    /// # Errors
    ///
    /// [`HarvestError::HttpClient`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, HarvestError> {
        Self::with_config(HarvestConfig::default())
    }

    /// A harvester talking to the STAC API and signing endpoint in `config`.
    ///
    /// # Errors
    ///
    /// * [`HarvestError::Validation`] if the retry settings are invalid.
    /// * [`HarvestError::HttpClient`] if the HTTP client cannot be built.
    pub fn with_config(config: HarvestConfig) -> Result<Self, HarvestError> {
        config.retry_policy()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()
            .map_err(HarvestError::HttpClient)?;
        let signing_url = config.sign_assets.then(|| config.signing_url.clone());
        let catalog = StacCatalog::new(
            client.clone(),
            &config.catalog_url,
            signing_url,
            config.page_size,
        );
        Ok(Self::with_components(
            Box::new(catalog),
            Box::new(GridEngine::new(client)),
            config,
        ))
    }

    /// A harvester over any catalog and engine implementation.
    pub fn with_components(
        catalog: Box<dyn CatalogClient>,
        engine: Box<dyn RasterEngine>,
        config: HarvestConfig,
    ) -> Self {
        Self {
            catalog,
            engine,
            sleeper: Box::new(ThreadSleeper),
            config,
        }
    }

    /// Replaces how the harvester waits between retries.
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Copernicus GLO-30 elevation.
    pub fn dem(&self) -> DemClient<'_> {
        DemClient::new(self)
    }

    /// MODIS products, resolved by variable name.
    pub fn modis(&self) -> ModisClient<'_> {
        ModisClient::new(self)
    }

    /// ESA WorldCover land cover.
    pub fn land_cover(&self) -> LandCoverClient<'_> {
        LandCoverClient::new(self)
    }

    /// Any collection of the catalog, by id.
    pub fn collection<'a>(&'a self, collection_id: &str) -> CollectionClient<'a> {
        CollectionClient::new(self, collection_id)
    }

    /// Finds the collection exposing `variable`, optionally only among ids
    /// starting with `family`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use rasterharvest::{Harvester, HarvestError};
    /// # fn main() -> Result<(), HarvestError> {
    /// let harvester = Harvester::new()?;
    /// let resolution = harvester
    ///     .find_collections()
    ///     .variable("LST_Day_1km")
    ///     .family("modis-")
    ///     .call()?;
    /// println!("Using {}", resolution.selected.id);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn find_collections(
        &self,
        variable: &str,
        family: Option<&str>,
    ) -> Result<Resolution, HarvestError> {
        let policy = self.config.retry_policy()?;
        let fetcher = RetryingFetcher::new(policy, self.sleeper.as_ref());
        let run = PipelineRun { source: "catalog" };
        run.stage(PipelineStage::ResolvingCollection, || {
            CollectionResolver::new(self.catalog.as_ref(), &fetcher).resolve(variable, family)
        })
    }

    /// Runs the whole pipeline for `source`.
    ///
    /// Every input is validated before the catalog is contacted. Area queries
    /// yield an [`ExtractionResult::Stack`], point queries an
    /// [`ExtractionResult::Points`].
    ///
    /// # Errors
    ///
    /// * [`HarvestError::Validation`] for bad input.
    /// * [`HarvestError::Pipeline`] naming the stage that failed.
    /// * [`HarvestError::DownloadDirCreation`] or
    ///   [`HarvestError::CacheDirResolution`] when downloading tiles.
    pub fn fetch(
        &self,
        source: &DataSource,
        query: SpatialQuery,
        variable: Option<&str>,
        time_range: Option<TimeRange>,
        options: FetchOptions,
    ) -> Result<ExtractionResult, HarvestError> {
        options.validate()?;
        let policy = self.config.retry_policy()?;
        let (extent, asset_key) = source.validate(&query, variable, time_range.as_ref())?;

        let fetcher = RetryingFetcher::new(policy, self.sleeper.as_ref());
        let run = PipelineRun {
            source: &source.name,
        };

        let collection_id = match (&options.collection, source.fixed_collection()) {
            (Some(id), _) => id.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => {
                let resolution = run.stage(PipelineStage::ResolvingCollection, || {
                    CollectionResolver::new(self.catalog.as_ref(), &fetcher)
                        .resolve(&asset_key, source.family_prefix())
                })?;
                resolution.selected.id
            }
        };

        let request = SearchRequest {
            collection_id,
            extent,
            time_range,
            limit: self.config.result_limit,
            asset_key,
            naming: source.naming,
        };
        let tiles = run.stage(PipelineStage::Querying, || {
            TileQuery::new(self.catalog.as_ref(), &fetcher).search(&request)
        })?;

        let scratch = if options.download {
            let dir = match (&options.output_dir, &self.config.download_dir) {
                (Some(dir), _) | (None, Some(dir)) => dir.clone(),
                (None, None) => get_cache_dir()
                    .map_err(HarvestError::CacheDirResolution)?
                    .join("tiles"),
            };
            Some(open_scratch(dir, options.clean_dir)?)
        } else {
            None
        };
        let assembler = TileAssembler::new(
            self.engine.as_ref(),
            self.catalog.as_ref(),
            &fetcher,
            scratch.as_ref(),
            options.crop,
        );
        let opened = run.stage(PipelineStage::Fetching, || {
            assembler.open_tiles(&tiles, &extent)
        })?;
        let stack = run.stage(PipelineStage::Assembling, || {
            assembler.assemble_opened(opened, &extent)
        })?;

        let processor = PostProcessor::new(self.engine.as_ref());
        let result = run.stage(PipelineStage::PostProcessing, || {
            processor.process(stack, &query, &options)
        })?;
        info!("{}: done", source.name);
        Ok(result)
    }
}

fn open_scratch(dir: PathBuf, clean: bool) -> Result<ScratchDir, HarvestError> {
    ScratchDir::open(dir.clone(), clean).map_err(|e| HarvestError::DownloadDirCreation(dir, e))
}
