//! Provides the `DemClient` for requesting Copernicus GLO-30 elevation.
//!
//! Obtained via [`Harvester::dem()`]. Elevation is static, so requests take no
//! time range.

use crate::sources::DataSource;
use crate::{ExtractionResult, FetchOptions, HarvestError, Harvester, LonLat, PointSet};
use crate::{SpatialExtent, SpatialQuery};
use bon::bon;

/// A client builder for Copernicus DEM requests.
///
/// Calling `.area(extent).call()` returns the elevation grid as an
/// [`ExtractionResult::Stack`]; `.points(points).call()` samples it into an
/// [`ExtractionResult::Points`].
pub struct DemClient<'a> {
    harvester: &'a Harvester,
}

#[bon]
impl<'a> DemClient<'a> {
    pub(crate) fn new(harvester: &'a Harvester) -> Self {
        Self { harvester }
    }

    /// Elevation over a bounding box.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use rasterharvest::{Harvester, HarvestError, SpatialExtent};
    /// # fn main() -> Result<(), HarvestError> {
    /// let harvester = Harvester::new()?;
    /// let jungfrau = SpatialExtent::new(7.9, 46.5, 8.0, 46.6)?;
    /// let stack = harvester.dem().area(jungfrau).call()?.into_stack();
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = area)]
    #[doc(hidden)]
    pub fn build_area(
        &self,
        #[builder(start_fn)] extent: SpatialExtent,
        options: Option<FetchOptions>,
    ) -> Result<ExtractionResult, HarvestError> {
        self.harvester.fetch(
            &DataSource::copernicus_dem(),
            SpatialQuery::Area(extent),
            None,
            None,
            options.unwrap_or_default(),
        )
    }

    /// Elevation at each of `points`.
    #[builder(start_fn = points)]
    #[doc(hidden)]
    pub fn build_points(
        &self,
        #[builder(start_fn)] points: Vec<LonLat>,
        options: Option<FetchOptions>,
    ) -> Result<ExtractionResult, HarvestError> {
        self.harvester.fetch(
            &DataSource::copernicus_dem(),
            SpatialQuery::Points(PointSet::new(points)?),
            None,
            None,
            options.unwrap_or_default(),
        )
    }
}
