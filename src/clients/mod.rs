pub mod collection_client;
pub mod dem_client;
pub mod land_cover_client;
pub mod modis_client;
