use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// One entry of a catalog's collection index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Union of the collection's `cube:variables` and `item_assets` keys.
    pub variables: BTreeSet<String>,
}

impl CollectionDescriptor {
    pub fn exposes(&self, variable: &str) -> bool {
        self.variables.contains(variable)
    }
}

/// A single remote raster asset matched by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDescriptor {
    pub collection_id: String,
    pub acquisition_date: NaiveDate,
    /// Grid cell identifier, e.g. `h18v04` or `N47E008`.
    pub tile_id: String,
    /// Locator of the asset. Becomes a signed URL once resolved.
    pub asset_href: String,
}

impl TileDescriptor {
    /// File name the tile is stored under when downloaded.
    ///
    /// Ends in a digest of the href without its query string, so assets that
    /// share a date and tile id get their own files while re-signed URLs of
    /// one asset keep the same name.
    pub fn file_name(&self) -> String {
        let location = self.asset_href.split('?').next().unwrap_or_default();
        let digest = hex::encode(Sha256::digest(location.as_bytes()));
        format!(
            "{}_{}_{}_{}.tif",
            sanitize(&self.collection_id),
            self.acquisition_date.format("%Y%m%d"),
            sanitize(&self.tile_id),
            &digest[..12]
        )
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// A tile that could not be reached or opened, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFailure {
    pub date: NaiveDate,
    pub tile_id: String,
    pub cause: String,
}

impl TileFailure {
    pub fn new(tile: &TileDescriptor, cause: &dyn std::error::Error) -> Self {
        let mut cause_text = cause.to_string();
        let mut source = cause.source();
        while let Some(inner) = source {
            cause_text.push_str(": ");
            cause_text.push_str(&inner.to_string());
            source = inner.source();
        }
        Self {
            date: tile.acquisition_date,
            tile_id: tile.tile_id.clone(),
            cause: cause_text,
        }
    }
}

impl fmt::Display for TileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.date, self.tile_id, self.cause)
    }
}

/// Renders failures as `date tile (cause); date tile (cause)`.
pub(crate) fn list_failures(failures: &[TileFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
