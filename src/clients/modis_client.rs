//! Provides the `ModisClient` for MODIS products.
//!
//! The collection is found by looking for a `modis-*` collection that exposes
//! the requested variable; pass [`FetchOptions::collection`] to pin one.

use crate::sources::DataSource;
use crate::{ExtractionResult, FetchOptions, HarvestError, Harvester, LonLat, PointSet};
use crate::{SpatialExtent, SpatialQuery, TimeRange};
use bon::bon;

/// A client builder for MODIS requests. Both the variable and a time range
/// are required.
pub struct ModisClient<'a> {
    harvester: &'a Harvester,
}

#[bon]
impl<'a> ModisClient<'a> {
    pub(crate) fn new(harvester: &'a Harvester) -> Self {
        Self { harvester }
    }

    /// One frame per acquisition date over a bounding box.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use rasterharvest::{BucketRule, FetchOptions, Harvester, HarvestError, SpatialExtent, TimeRange};
    /// # fn main() -> Result<(), HarvestError> {
    /// let harvester = Harvester::new()?;
    /// let stack = harvester
    ///     .modis()
    ///     .area(SpatialExtent::new(5.0, 45.0, 6.0, 46.0)?)
    ///     .variable("LST_Day_1km")
    ///     .time_range(TimeRange::new("2024-06", "2024-08")?)
    ///     .options(FetchOptions::builder().agg_level(BucketRule::Month).build())
    ///     .call()?
    ///     .into_stack();
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = area)]
    #[doc(hidden)]
    pub fn build_area(
        &self,
        #[builder(start_fn)] extent: SpatialExtent,
        variable: &str,
        time_range: Option<TimeRange>,
        options: Option<FetchOptions>,
    ) -> Result<ExtractionResult, HarvestError> {
        self.harvester.fetch(
            &DataSource::modis(),
            SpatialQuery::Area(extent),
            Some(variable),
            time_range,
            options.unwrap_or_default(),
        )
    }

    /// Time series of `variable` at each of `points`.
    #[builder(start_fn = points)]
    #[doc(hidden)]
    pub fn build_points(
        &self,
        #[builder(start_fn)] points: Vec<LonLat>,
        variable: &str,
        time_range: Option<TimeRange>,
        options: Option<FetchOptions>,
    ) -> Result<ExtractionResult, HarvestError> {
        self.harvester.fetch(
            &DataSource::modis(),
            SpatialQuery::Points(PointSet::new(points)?),
            Some(variable),
            time_range,
            options.unwrap_or_default(),
        )
    }
}
