//! Client-wide configuration and per-call fetch options.

use crate::error::{HarvestError, ValidationError};
use crate::fetch::retry::RetryPolicy;
use crate::processing::aggregation::BucketRule;
use crate::raster::ops::Reducer;
use bon::Builder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://planetarycomputer.microsoft.com/api/stac/v1";
pub const DEFAULT_SIGNING_URL: &str = "https://planetarycomputer.microsoft.com/api/sas/v1/sign";

/// Settings shared by every request a [`crate::Harvester`] makes.
///
/// All fields have defaults, so a JSON file only needs the keys it changes.
///
/// # Examples
///
/// ```
/// use rasterharvest::HarvestConfig;
///
/// let config = HarvestConfig::builder()
///     .timeout_secs(120)
///     .max_attempts(5)
///     .build();
/// assert_eq!(config.retry_policy().unwrap().max_attempts(), 5);
/// assert!(config.catalog_url.starts_with("https://planetarycomputer"));
/// ```
#[derive(Debug, Clone, Deserialize, Builder)]
#[serde(default)]
pub struct HarvestConfig {
    /// Root of the STAC API.
    #[builder(default = DEFAULT_CATALOG_URL.to_string())]
    pub catalog_url: String,
    /// Endpoint that turns an asset href into a readable (signed) URL.
    #[builder(default = DEFAULT_SIGNING_URL.to_string())]
    pub signing_url: String,
    /// When unset, asset hrefs are used as returned by the catalog.
    #[builder(default = true)]
    pub sign_assets: bool,
    /// Timeout applied to every HTTP request.
    #[builder(default = 60)]
    pub timeout_secs: u64,
    #[builder(default = 3)]
    pub max_attempts: u32,
    #[builder(default = 2000)]
    pub initial_delay_ms: u64,
    /// Maximum number of tiles a single search may return.
    #[builder(default = 500)]
    pub result_limit: usize,
    /// Page size requested from the search endpoint.
    #[builder(default = 100)]
    pub page_size: usize,
    #[builder(default = format!("rasterharvest/{}", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,
    /// Where tiles are downloaded when no `output_dir` is given. Defaults to
    /// the user's cache directory.
    pub download_dir: Option<PathBuf>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig::builder().build()
    }
}

impl HarvestConfig {
    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, HarvestError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| HarvestError::ConfigRead(path.to_path_buf(), e))?;
        serde_json::from_str(&contents).map_err(|e| HarvestError::ConfigParse(path.to_path_buf(), e))
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ValidationError> {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Per-call options of a fetch.
///
/// # Examples
///
/// ```
/// use rasterharvest::{BucketRule, FetchOptions};
///
/// let options = FetchOptions::builder()
///     .agg_level(BucketRule::Month)
///     .gapfill_window(3)
///     .build();
/// assert!(options.crop);
/// assert!(!options.download);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct FetchOptions {
    /// Collection to use instead of resolving one from the variable.
    #[builder(into)]
    pub collection: Option<String>,
    /// Clip frames to the requested extent.
    #[builder(default = true)]
    pub crop: bool,
    /// Odd window size (at least 3) used to fill no-data cells.
    pub gapfill_window: Option<usize>,
    /// Temporal aggregation applied after assembly.
    pub agg_level: Option<BucketRule>,
    #[builder(default)]
    pub agg_reducer: Reducer,
    /// Download tiles to disk before opening them instead of streaming.
    #[builder(default)]
    pub download: bool,
    /// Directory for downloaded tiles.
    pub output_dir: Option<PathBuf>,
    /// Remove the tiles this call downloaded once it finishes.
    #[builder(default)]
    pub clean_dir: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions::builder().build()
    }
}

impl FetchOptions {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if let Some(window) = self.gapfill_window {
            if window < 3 || window % 2 == 0 {
                return Err(ValidationError::InvalidGapfillWindow(window));
            }
        }
        Ok(())
    }
}
