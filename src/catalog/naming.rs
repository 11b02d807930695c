//! Decoding acquisition dates and grid cells from catalog item identifiers.

use crate::catalog::error::CatalogError;
use chrono::NaiveDate;
use std::fmt;

/// How a collection encodes date and grid cell in its item identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingConvention {
    /// `MOD11A2.A2025009.h18v04.061.2025018...`: `A{YYYY}{DDD}` day of year
    /// and `hXXvYY` sinusoidal tile.
    Modis,
    /// `Copernicus_DSM_COG_10_N47_00_E008_00_DEM`: tile `N47E008`, date from
    /// the item properties.
    CopernicusDem,
    /// `ESA_WorldCover_10m_2021_v200_N45E006`: 1 January of the year token and
    /// tile `N45E006`.
    EsaWorldCover,
    /// Date from the item's `datetime` (or `start_datetime`), the item id as
    /// tile.
    #[default]
    ItemProperties,
}

impl NamingConvention {
    fn name(&self) -> &'static str {
        match self {
            NamingConvention::Modis => "MODIS",
            NamingConvention::CopernicusDem => "Copernicus DEM",
            NamingConvention::EsaWorldCover => "ESA WorldCover",
            NamingConvention::ItemProperties => "item properties",
        }
    }

    /// Returns the acquisition date and tile id of an item.
    ///
    /// `datetime` is the date from the item's properties, if it has one.
    pub fn decode(
        &self,
        item_id: &str,
        datetime: Option<NaiveDate>,
    ) -> Result<(NaiveDate, String), CatalogError> {
        let decoded = match self {
            NamingConvention::Modis => decode_modis(item_id),
            NamingConvention::CopernicusDem => {
                decode_copernicus_tile(item_id).and_then(|tile| Some((datetime?, tile)))
            }
            NamingConvention::EsaWorldCover => decode_worldcover(item_id),
            NamingConvention::ItemProperties => datetime.map(|d| (d, item_id.to_string())),
        };
        decoded.ok_or_else(|| CatalogError::UnreadableIdentifier {
            item_id: item_id.to_string(),
            convention: self.name(),
        })
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn decode_modis(item_id: &str) -> Option<(NaiveDate, String)> {
    let mut date = None;
    let mut tile = None;
    for token in item_id.split(['.', '_']) {
        if let Some(digits) = token.strip_prefix('A') {
            if digits.len() == 7 && all_digits(digits) {
                let year = digits[..4].parse().ok()?;
                let day = digits[4..].parse().ok()?;
                date = NaiveDate::from_yo_opt(year, day);
                continue;
            }
        }
        if is_sinusoidal_tile(token) {
            tile = Some(token.to_string());
        }
    }
    Some((date?, tile?))
}

/// `hXXvYY`
fn is_sinusoidal_tile(token: &str) -> bool {
    matches!(
        token.as_bytes(),
        [b'h', h1, h2, b'v', v1, v2] if [h1, h2, v1, v2].iter().all(|b| b.is_ascii_digit())
    )
}

fn decode_copernicus_tile(item_id: &str) -> Option<String> {
    let tokens: Vec<&str> = item_id.split('_').collect();
    tokens.windows(3).find_map(|w| {
        let lat = w[0];
        let lon = w[2];
        let lat_ok = lat.len() == 3 && lat.starts_with(['N', 'S']) && all_digits(&lat[1..]);
        let lon_ok = lon.len() == 4 && lon.starts_with(['E', 'W']) && all_digits(&lon[1..]);
        (lat_ok && all_digits(w[1]) && lon_ok).then(|| format!("{}{}", lat, lon))
    })
}

/// `N45E006`
fn is_degree_tile(token: &str) -> bool {
    matches!(
        token.as_bytes(),
        [b'N' | b'S', a, b, b'E' | b'W', c, d, e] if [a, b, c, d, e].iter().all(|x| x.is_ascii_digit())
    )
}

fn decode_worldcover(item_id: &str) -> Option<(NaiveDate, String)> {
    let mut date = None;
    let mut tile = None;
    for token in item_id.split('_') {
        if token.len() == 4 && all_digits(token) {
            date = token
                .parse()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
        } else if is_degree_tile(token) {
            tile = Some(token.to_string());
        }
    }
    Some((date?, tile?))
}
