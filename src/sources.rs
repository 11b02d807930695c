//! The data sources the harvester knows how to fetch.

use crate::catalog::naming::NamingConvention;
use crate::error::ValidationError;
use crate::types::extent::{SpatialExtent, SpatialQuery};
use crate::types::time_range::TimeRange;

/// How the collection of a source is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionSelector {
    /// Always this collection.
    Fixed(String),
    /// The collection with this id prefix that exposes the requested variable.
    Family(String),
}

/// Which asset of a matched item holds the data.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetSelector {
    Fixed(String),
    /// The asset named after the requested variable.
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRequirement {
    /// The source is static; a time range is not used.
    Static,
    Optional,
    Required,
}

/// Everything the pipeline needs to know about one kind of dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub name: String,
    pub collection: CollectionSelector,
    pub asset: AssetSelector,
    pub naming: NamingConvention,
    /// Degrees added around point queries when searching for tiles.
    pub point_margin: f64,
    pub time: TimeRequirement,
    /// Area the source covers, if it is not global.
    pub domain: Option<SpatialExtent>,
}

impl DataSource {
    /// Copernicus GLO-30 digital elevation model.
    pub fn copernicus_dem() -> Self {
        Self {
            name: "Copernicus DEM".to_string(),
            collection: CollectionSelector::Fixed("cop-dem-glo-30".to_string()),
            asset: AssetSelector::Fixed("data".to_string()),
            naming: NamingConvention::CopernicusDem,
            point_margin: 0.1,
            time: TimeRequirement::Static,
            domain: None,
        }
    }

    /// MODIS products; the collection is resolved from the variable.
    pub fn modis() -> Self {
        Self {
            name: "MODIS".to_string(),
            collection: CollectionSelector::Family("modis-".to_string()),
            asset: AssetSelector::Variable,
            naming: NamingConvention::Modis,
            point_margin: 0.2,
            time: TimeRequirement::Required,
            domain: None,
        }
    }

    /// ESA WorldCover 10 m land cover.
    pub fn esa_worldcover() -> Self {
        Self {
            name: "ESA WorldCover".to_string(),
            collection: CollectionSelector::Fixed("esa-worldcover".to_string()),
            asset: AssetSelector::Fixed("map".to_string()),
            naming: NamingConvention::EsaWorldCover,
            point_margin: 0.1,
            time: TimeRequirement::Optional,
            domain: Some(SpatialExtent::new(-180.0, -60.0, 180.0, 84.0).unwrap_or(SpatialExtent::WORLD)),
        }
    }

    /// Any collection, reading `asset` and dating items by their properties.
    pub fn custom(collection_id: &str, asset: &str) -> Self {
        Self {
            name: collection_id.to_string(),
            collection: CollectionSelector::Fixed(collection_id.to_string()),
            asset: AssetSelector::Fixed(asset.to_string()),
            naming: NamingConvention::ItemProperties,
            point_margin: 0.1,
            time: TimeRequirement::Optional,
            domain: None,
        }
    }

    /// Checks a request against the source.
    ///
    /// Returns the extent to search, with point queries padded by
    /// [`Self::point_margin`], and the asset key to read. Areas must lie inside
    /// the source's domain; for point queries only the points have to, and the
    /// padded extent is clamped to the domain.
    pub fn validate(
        &self,
        query: &SpatialQuery,
        variable: Option<&str>,
        time_range: Option<&TimeRange>,
    ) -> Result<(SpatialExtent, String), ValidationError> {
        let extent = self.search_extent(query)?;
        if self.time == TimeRequirement::Required && time_range.is_none() {
            return Err(ValidationError::MissingTimeRange {
                data_source: self.name.clone(),
            });
        }
        let asset_key = self.asset_key(variable)?;
        Ok((extent, asset_key))
    }

    fn search_extent(&self, query: &SpatialQuery) -> Result<SpatialExtent, ValidationError> {
        let extent = query.search_extent(self.point_margin)?;
        let Some(domain) = &self.domain else {
            return Ok(extent);
        };
        match query {
            SpatialQuery::Area(area) if !area.is_within(domain) => {
                Err(ValidationError::OutsideDomain {
                    data_source: self.name.clone(),
                    extent: *area,
                    domain: *domain,
                })
            }
            SpatialQuery::Area(_) => Ok(extent),
            SpatialQuery::Points(points) => {
                if let Some(outside) = points.iter().find(|p| !domain.contains(p.lon(), p.lat())) {
                    return Err(ValidationError::PointOutsideDomain {
                        data_source: self.name.clone(),
                        lon: outside.lon(),
                        lat: outside.lat(),
                        domain: *domain,
                    });
                }
                extent
                    .intersection(domain)
                    .ok_or_else(|| ValidationError::OutsideDomain {
                        data_source: self.name.clone(),
                        extent,
                        domain: *domain,
                    })
            }
        }
    }

    fn asset_key(&self, variable: Option<&str>) -> Result<String, ValidationError> {
        match &self.asset {
            AssetSelector::Fixed(key) => Ok(key.clone()),
            AssetSelector::Variable => variable
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| ValidationError::MissingVariable {
                    data_source: self.name.clone(),
                }),
        }
    }

    /// The collection when it does not depend on the variable.
    pub fn fixed_collection(&self) -> Option<&str> {
        match &self.collection {
            CollectionSelector::Fixed(id) => Some(id),
            CollectionSelector::Family(_) => None,
        }
    }

    pub fn family_prefix(&self) -> Option<&str> {
        match &self.collection {
            CollectionSelector::Family(prefix) => Some(prefix),
            CollectionSelector::Fixed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::extent::{LonLat, PointSet};

    fn area(west: f64, south: f64, east: f64, north: f64) -> SpatialQuery {
        SpatialQuery::Area(SpatialExtent::new(west, south, east, north).unwrap())
    }

    fn points(points: &[LonLat]) -> SpatialQuery {
        SpatialQuery::Points(PointSet::new(points.to_vec()).unwrap())
    }

    #[test]
    fn test_modis_needs_variable_and_time_range() {
        let modis = DataSource::modis();
        let query = area(5.0, 45.0, 6.0, 46.0);
        let range = TimeRange::new("2025-01-01", "2025-01-31").unwrap();
        assert!(matches!(
            modis.validate(&query, Some("LST_Day_1km"), None),
            Err(ValidationError::MissingTimeRange { .. })
        ));
        assert!(matches!(
            modis.validate(&query, None, Some(&range)),
            Err(ValidationError::MissingVariable { .. })
        ));
        let (extent, asset_key) = modis
            .validate(&query, Some("LST_Day_1km"), Some(&range))
            .unwrap();
        assert_eq!(asset_key, "LST_Day_1km");
        assert_eq!(extent, SpatialExtent::new(5.0, 45.0, 6.0, 46.0).unwrap());
    }

    #[test]
    fn test_worldcover_domain() {
        let source = DataSource::esa_worldcover();
        assert!(matches!(
            source.validate(&area(0.0, -80.0, 10.0, -70.0), None, None),
            Err(ValidationError::OutsideDomain { .. })
        ));
        let (_, asset_key) = source
            .validate(&area(6.0, 45.0, 7.0, 46.0), None, None)
            .unwrap();
        assert_eq!(asset_key, "map");
    }

    #[test]
    fn test_points_near_the_domain_edge_are_accepted() {
        let source = DataSource::esa_worldcover();
        let (extent, _) = source
            .validate(&points(&[LonLat(10.0, 83.95), LonLat(-70.0, -59.95)]), None, None)
            .unwrap();
        assert_eq!(extent.north(), 84.0);
        assert_eq!(extent.south(), -60.0);
        assert!((extent.west() - -70.1).abs() < 1e-9);

        assert!(matches!(
            source.validate(&points(&[LonLat(10.0, 50.0), LonLat(10.0, 84.5)]), None, None),
            Err(ValidationError::PointOutsideDomain { lat, .. }) if lat == 84.5
        ));
    }
}
