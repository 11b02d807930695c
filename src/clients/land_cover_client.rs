//! Provides the `LandCoverClient` for ESA WorldCover classes.

use crate::sources::DataSource;
use crate::{ExtractionResult, FetchOptions, HarvestError, Harvester, LonLat, PointSet};
use crate::{SpatialExtent, SpatialQuery, TimeRange};
use bon::bon;

/// A client builder for ESA WorldCover requests. Without a time range every
/// release is returned, one frame per release year.
pub struct LandCoverClient<'a> {
    harvester: &'a Harvester,
}

#[bon]
impl<'a> LandCoverClient<'a> {
    pub(crate) fn new(harvester: &'a Harvester) -> Self {
        Self { harvester }
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
            &DataSource::esa_worldcover(),
            SpatialQuery::Area(extent),
            None,
            time_range,
            options.unwrap_or_default(),
        )
    }

    /// Land cover class at each of `points`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use rasterharvest::{Harvester, HarvestError, LonLat, TimeRange, Year};
    /// # fn main() -> Result<(), HarvestError> {
    /// let harvester = Harvester::new()?;
    /// let table = harvester
    ///     .land_cover()
    ///     .points(vec![LonLat(5.12, 52.09), LonLat(4.89, 52.37)])
    ///     .time_range(TimeRange::from_period(Year(2021))?)
    ///     .call()?
    ///     .into_points();
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = points)]
    #[doc(hidden)]
    pub fn build_points(
        &self,
        #[builder(start_fn)] points: Vec<LonLat>,
        time_range: Option<TimeRange>,
        options: Option<FetchOptions>,
    ) -> Result<ExtractionResult, HarvestError> {
        self.harvester.fetch(
            &DataSource::esa_worldcover(),
            SpatialQuery::Points(PointSet::new(points)?),
            None,
            time_range,
            options.unwrap_or_default(),
        )
    }
}
