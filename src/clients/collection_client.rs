//! Provides the `CollectionClient` for collections without a dedicated client.

use crate::sources::DataSource;
use crate::{ExtractionResult, FetchOptions, HarvestError, Harvester, LonLat, PointSet};
use crate::{SpatialExtent, SpatialQuery, TimeRange};
use bon::bon;

const DEFAULT_ASSET: &str = "data";

/// A client builder for an arbitrary collection, obtained via
/// [`Harvester::collection()`].
///
/// Item dates come from the items' `datetime` property. The `data` asset is
/// read unless another one is chosen with [`CollectionClient::asset`].
///
/// ```no_run
/// # use rasterharvest::{Harvester, HarvestError, SpatialExtent};
/// # fn main() -> Result<(), HarvestError> {
/// let harvester = Harvester::new()?;
/// let stack = harvester
///     .collection("io-lulc-annual-v02")
///     .area(SpatialExtent::new(5.0, 52.0, 5.2, 52.2)?)
///     .call()?;
/// # Ok(())
/// # }
/// ```
pub struct CollectionClient<'a> {
    harvester: &'a Harvester,
    collection_id: String,
    asset: String,
}

#[bon]
impl<'a> CollectionClient<'a> {
    pub(crate) fn new(harvester: &'a Harvester, collection_id: &str) -> Self {
        Self {
            harvester,
            collection_id: collection_id.to_string(),
            asset: DEFAULT_ASSET.to_string(),
        }
    }

    /// Reads the asset with key `asset` from every item.
    pub fn asset(mut self, asset: &str) -> Self {
        self.asset = asset.to_string();
        self
    }

    fn source(&self) -> DataSource {
        DataSource::custom(&self.collection_id, &self.asset)
    }

    #[builder(start_fn = area)]
    #[doc(hidden)]
    pub fn build_area(
        &self,
        #[builder(start_fn)] extent: SpatialExtent,
        time_range: Option<TimeRange>,
        options: Option<FetchOptions>,
    ) -> Result<ExtractionResult, HarvestError> {
        self.harvester.fetch(
            &self.source(),
            SpatialQuery::Area(extent),
            None,
            time_range,
            options.unwrap_or_default(),
        )
    }

    #[builder(start_fn = points)]
    #[doc(hidden)]
    pub fn build_points(
        &self,
        #[builder(start_fn)] points: Vec<LonLat>,
        time_range: Option<TimeRange>,
        options: Option<FetchOptions>,
    ) -> Result<ExtractionResult, HarvestError> {
        self.harvester.fetch(
            &self.source(),
            SpatialQuery::Points(PointSet::new(points)?),
            None,
            time_range,
            options.unwrap_or_default(),
        )
    }
}
