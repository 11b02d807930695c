//! A [`CatalogClient`] for STAC APIs such as the Planetary Computer.

use crate::catalog::error::CatalogError;
use crate::catalog::{CatalogClient, SearchRequest};
use crate::types::descriptor::{CollectionDescriptor, TileDescriptor};
use chrono::{DateTime, NaiveDate};
use log::{debug, info, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Deserialize)]
struct Link {
    rel: String,
    href: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    body: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CollectionsPage {
    collections: Vec<Value>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "cube:variables", default)]
    cube_variables: BTreeMap<String, Value>,
    #[serde(default)]
    item_assets: BTreeMap<String, Value>,
}

impl From<RawCollection> for CollectionDescriptor {
    fn from(raw: RawCollection) -> Self {
        let variables = raw
            .cube_variables
            .into_keys()
            .chain(raw.item_assets.into_keys())
            .collect();
        CollectionDescriptor {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            variables,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemCollection {
    features: Vec<RawItem>,
    #[serde(default)]
    links: Vec<Link>,
}

/// A page of a paged STAC response.
trait Paged {
    type Entry;

    fn into_parts(self) -> (Vec<Self::Entry>, Vec<Link>);
}

impl Paged for CollectionsPage {
    type Entry = Value;

    fn into_parts(self) -> (Vec<Value>, Vec<Link>) {
        (self.collections, self.links)
    }
}

impl Paged for ItemCollection {
    type Entry = RawItem;

    fn into_parts(self) -> (Vec<RawItem>, Vec<Link>) {
        (self.features, self.links)
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: String,
    #[serde(default)]
    properties: ItemProperties,
    #[serde(default)]
    assets: BTreeMap<String, RawAsset>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemProperties {
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    start_datetime: Option<String>,
}

impl ItemProperties {
    fn date(&self) -> Option<NaiveDate> {
        self.datetime
            .as_deref()
            .or(self.start_datetime.as_deref())
            .and_then(parse_stac_date)
    }
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    href: String,
}

#[derive(Debug, Deserialize)]
struct SignedHref {
    href: String,
}

fn parse_stac_date(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok())
}

/// STAC API client over blocking HTTP.
///
/// Collections come from `GET /collections`, tiles from `POST /search`, both
/// following `next` links. With a signing URL configured, asset hrefs are
/// exchanged for signed URLs (`GET {signing_url}?href=...`).
pub struct StacCatalog {
    client: Client,
    root: String,
    signing_url: Option<String>,
    page_size: usize,
}

impl StacCatalog {
    pub fn new(client: Client, root: &str, signing_url: Option<String>, page_size: usize) -> Self {
        Self {
            client,
            root: root.trim_end_matches('/').to_string(),
            signing_url,
            page_size: page_size.max(1),
        }
    }

    fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, CatalogError> {
        let response = request
            .send()
            .map_err(|e| CatalogError::NetworkRequest(url.to_string(), e))?;
        match response.error_for_status() {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!("HTTP error for {}: {}", url, e);
                Err(match e.status() {
                    Some(status) => CatalogError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    },
                    None => CatalogError::NetworkRequest(url.to_string(), e),
                })
            }
        }
    }

    fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, CatalogError> {
        let body = self
            .send(request, url)?
            .text()
            .map_err(|e| CatalogError::NetworkRequest(url.to_string(), e))?;
        serde_json::from_str(&body).map_err(|e| CatalogError::JsonParse(url.to_string(), e))
    }

    /// Builds the request that follows a `next` link.
    fn follow(&self, link: &Link) -> RequestBuilder {
        match (link.method.as_deref(), &link.body) {
            (Some(method), Some(body)) if method.eq_ignore_ascii_case("POST") => {
                self.client.post(&link.href).json(body)
            }
            _ => self.client.get(&link.href),
        }
    }

    /// Fetches one page: the first one through `first`, later ones by
    /// following `link`. Returns the page together with the URL it came from.
    fn fetch_page<P: DeserializeOwned>(
        &self,
        link: Option<&Link>,
        first_url: &str,
        first: impl FnOnce() -> RequestBuilder,
    ) -> Result<(String, P), CatalogError> {
        let (request, url) = match link {
            Some(link) => (self.follow(link), link.href.clone()),
            None => (first(), first_url.to_string()),
        };
        let page = self.fetch_json(request, &url)?;
        Ok((url, page))
    }
}

fn tile_from_item(
    item: RawItem,
    request: &SearchRequest,
    url: &str,
) -> Result<TileDescriptor, CatalogError> {
    let (acquisition_date, tile_id) = request.naming.decode(&item.id, item.properties.date())?;
    let asset = item
        .assets
        .get(&request.asset_key)
        .ok_or_else(|| CatalogError::MalformedResponse {
            url: url.to_string(),
            reason: format!("item '{}' has no asset '{}'", item.id, request.asset_key),
        })?;
    Ok(TileDescriptor {
        collection_id: request.collection_id.clone(),
        acquisition_date,
        tile_id,
        asset_href: asset.href.clone(),
    })
}

/// Collects entries across pages until a page has no `next` link or `limit`
/// entries are gathered.
///
/// `fetch` receives `None` for the first page and the previous page's `next`
/// link afterwards. `convert` may skip an entry by returning `Ok(None)`.
fn walk_pages<P: Paged, T>(
    limit: usize,
    mut fetch: impl FnMut(Option<&Link>) -> Result<(String, P), CatalogError>,
    mut convert: impl FnMut(P::Entry, &str) -> Result<Option<T>, CatalogError>,
) -> Result<Vec<T>, CatalogError> {
    let mut entries = Vec::new();
    let mut next: Option<Link> = None;
    loop {
        let (url, page) = fetch(next.as_ref())?;
        let (items, links) = page.into_parts();
        debug!("Page from {} holds {} entries", url, items.len());
        for item in items {
            if entries.len() >= limit {
                break;
            }
            if let Some(entry) = convert(item, &url)? {
                entries.push(entry);
            }
        }
        next = links.into_iter().find(|l| l.rel == "next");
        if entries.len() >= limit && next.is_some() {
            warn!("Stopped paging at {}: result limit of {} reached", url, limit);
            break;
        }
        if next.is_none() {
            break;
        }
    }
    Ok(entries)
}

impl CatalogClient for StacCatalog {
    fn list_collections(&self) -> Result<Vec<CollectionDescriptor>, CatalogError> {
        let first_url = format!("{}/collections", self.root);
        let collections = walk_pages(
            usize::MAX,
            |link| {
                self.fetch_page::<CollectionsPage>(link, &first_url, || {
                    self.client.get(&first_url)
                })
            },
            |entry, url| match serde_json::from_value::<RawCollection>(entry) {
                Ok(raw) => Ok(Some(CollectionDescriptor::from(raw))),
                Err(e) => {
                    warn!("Skipping malformed collection entry from {}: {}", url, e);
                    Ok(None)
                }
            },
        )?;
        info!("Catalog lists {} collections", collections.len());
        Ok(collections)
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<TileDescriptor>, CatalogError> {
        let first_url = format!("{}/search", self.root);
        let mut body = json!({
            "collections": [request.collection_id],
            "bbox": request.extent.to_bbox(),
            "limit": self.page_size.min(request.limit.max(1)),
        });
        if let Some(range) = &request.time_range {
            body["datetime"] = Value::String(range.to_stac_interval());
        }
        walk_pages(
            request.limit,
            |link| {
                self.fetch_page::<ItemCollection>(link, &first_url, || {
                    self.client.post(&first_url).json(&body)
                })
            },
            |item, url| tile_from_item(item, request, url).map(Some),
        )
    }

    fn resolve_asset_locator(&self, href: &str) -> Result<String, CatalogError> {
        let Some(signing_url) = &self.signing_url else {
            return Ok(href.to_string());
        };
        let request = self.client.get(signing_url).query(&[("href", href)]);
        let signed: SignedHref = self.fetch_json(request, signing_url)?;
        Ok(signed.href)
    }

    fn check_asset(&self, url: &str) -> Result<(), CatalogError> {
        self.send(self.client.head(url), url)?;
        Ok(())
    }

    fn download_asset(&self, url: &str, destination: &Path) -> Result<u64, CatalogError> {
        let mut response = self.send(self.client.get(url), url)?;
        let dir = destination.parent().unwrap_or_else(|| Path::new("."));
        let write_err = |e: io::Error| CatalogError::FileWrite(destination.to_path_buf(), e);

        fs::create_dir_all(dir).map_err(write_err)?;
        let mut partial = NamedTempFile::new_in(dir).map_err(write_err)?;
        let written = response.copy_to(partial.as_file_mut()).map_err(|e| {
            CatalogError::NetworkRequest(url.to_string(), e)
        })?;
        partial
            .persist(destination)
            .map_err(|e| write_err(e.error))?;
        info!("Downloaded {} bytes to {}", written, destination.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::naming::NamingConvention;
    use crate::types::extent::SpatialExtent;

    fn request(naming: NamingConvention, asset_key: &str) -> SearchRequest {
        SearchRequest {
            collection_id: "modis-11A2-061".to_string(),
            extent: SpatialExtent::new(5.0, 45.0, 6.0, 46.0).unwrap(),
            time_range: None,
            limit: 10,
            asset_key: asset_key.to_string(),
            naming,
        }
    }

    #[test]
    fn test_collection_variables_merge_cube_and_item_assets() {
        let raw: RawCollection = serde_json::from_value(json!({
            "id": "era5-pds",
            "title": "ERA5",
            "cube:variables": {"air_temperature_at_2_metres": {}},
            "item_assets": {"precipitation_amount_1hour_Accumulation": {}},
        }))
        .unwrap();
        let descriptor = CollectionDescriptor::from(raw);
        assert!(descriptor.exposes("air_temperature_at_2_metres"));
        assert!(descriptor.exposes("precipitation_amount_1hour_Accumulation"));
        assert_eq!(descriptor.description, None);
    }

    #[test]
    fn test_item_becomes_tile() -> Result<(), CatalogError> {
        let item: RawItem = serde_json::from_value(json!({
            "id": "MOD11A2.A2025009.h18v04.061.2025018035432",
            "properties": {"datetime": null, "start_datetime": "2025-01-09T00:00:00Z"},
            "assets": {"LST_Day_1km": {"href": "https://example.org/a.tif"}},
        }))
        .unwrap();
        let tile = tile_from_item(
            item,
            &request(NamingConvention::Modis, "LST_Day_1km"),
            "https://example.org/stac/search",
        )?;
        assert_eq!(tile.tile_id, "h18v04");
        assert_eq!(tile.acquisition_date, NaiveDate::from_ymd_opt(2025, 1, 9).unwrap());
        assert_eq!(tile.asset_href, "https://example.org/a.tif");
        Ok(())
    }

    #[test]
    fn test_item_without_requested_asset_is_malformed() {
        let item: RawItem = serde_json::from_value(json!({
            "id": "item-1",
            "properties": {"datetime": "2024-06-01T10:30:00Z"},
            "assets": {"other": {"href": "https://example.org/b.tif"}},
        }))
        .unwrap();
        let result = tile_from_item(
            item,
            &request(NamingConvention::ItemProperties, "data"),
            "https://example.org/stac/search",
        );
        assert!(matches!(
            result,
            Err(CatalogError::MalformedResponse { .. })
        ));
    }

    fn item_page(ids: &[&str], next: Option<Value>) -> ItemCollection {
        let features: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "properties": {"datetime": "2024-06-01T00:00:00Z"},
                    "assets": {"data": {"href": format!("https://example.org/{}.tif", id)}},
                })
            })
            .collect();
        let links: Vec<Value> = next.into_iter().collect();
        serde_json::from_value(json!({"features": features, "links": links})).unwrap()
    }

    fn next_get(href: &str) -> Option<Value> {
        Some(json!({"rel": "next", "href": href}))
    }

    #[test]
    fn test_search_follows_next_links_across_pages() -> Result<(), CatalogError> {
        let search_url = "https://example.org/stac/search";
        let mut pages = vec![
            item_page(
                &["a", "b"],
                Some(json!({
                    "rel": "next",
                    "href": search_url,
                    "method": "POST",
                    "body": {"token": "page-2"},
                })),
            ),
            item_page(&["c"], next_get("https://example.org/stac/search?token=page-3")),
            item_page(&["d"], None),
        ]
        .into_iter();
        let req = request(NamingConvention::ItemProperties, "data");
        let mut followed = Vec::new();
        let tiles = walk_pages(
            req.limit,
            |link| {
                followed.push(link.map(|l| (l.href.clone(), l.method.clone(), l.body.clone())));
                let page = pages.next().expect("no page after the last one");
                Ok((search_url.to_string(), page))
            },
            |item, url| tile_from_item(item, &req, url).map(Some),
        )?;

        let ids: Vec<&str> = tiles.iter().map(|t| t.tile_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(
            followed,
            vec![
                None,
                Some((
                    search_url.to_string(),
                    Some("POST".to_string()),
                    Some(json!({"token": "page-2"}))
                )),
                Some((
                    "https://example.org/stac/search?token=page-3".to_string(),
                    None,
                    None
                )),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_search_stops_at_result_limit() -> Result<(), CatalogError> {
        let mut fetched = 0;
        let mut req = request(NamingConvention::ItemProperties, "data");
        req.limit = 3;
        let tiles = walk_pages(
            req.limit,
            |_| {
                fetched += 1;
                let ids = [format!("p{}-1", fetched), format!("p{}-2", fetched)];
                let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                Ok((
                    "https://example.org/stac/search".to_string(),
                    item_page(&ids, next_get("https://example.org/stac/search?more")),
                ))
            },
            |item, url| tile_from_item(item, &req, url).map(Some),
        )?;

        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[2].tile_id, "p2-1");
        assert_eq!(fetched, 2);
        Ok(())
    }

    #[test]
    fn test_malformed_collections_are_skipped_across_pages() -> Result<(), CatalogError> {
        let mut pages = vec![
            json!({
                "collections": [{"id": "cop-dem-glo-30"}, {"title": "no id"}],
                "links": [{"rel": "next", "href": "https://example.org/stac/collections?page=2"}],
            }),
            json!({"collections": [{"id": "esa-worldcover"}], "links": []}),
        ]
        .into_iter();
        let collections = walk_pages(
            usize::MAX,
            |_| {
                let page: CollectionsPage = serde_json::from_value(pages.next().unwrap()).unwrap();
                Ok(("https://example.org/stac/collections".to_string(), page))
            },
            |entry, _| {
                Ok(serde_json::from_value::<RawCollection>(entry)
                    .ok()
                    .map(CollectionDescriptor::from))
            },
        )?;
        let ids: Vec<&str> = collections.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cop-dem-glo-30", "esa-worldcover"]);
        Ok(())
    }

    #[test]
    fn test_next_link_with_body_is_posted() {
        let catalog = StacCatalog::new(Client::new(), "https://example.org/stac", None, 100);
        let post: Link = serde_json::from_value(json!({
            "rel": "next",
            "href": "https://example.org/stac/search",
            "method": "POST",
            "body": {"token": "page-2", "limit": 100},
        }))
        .unwrap();
        let built = catalog.follow(&post).build().unwrap();
        assert_eq!(built.method(), reqwest::Method::POST);
        let sent: Value =
            serde_json::from_slice(built.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
        assert_eq!(sent, json!({"token": "page-2", "limit": 100}));

        let get: Link = serde_json::from_value(json!({
            "rel": "next",
            "href": "https://example.org/stac/search?token=page-3",
        }))
        .unwrap();
        let built = catalog.follow(&get).build().unwrap();
        assert_eq!(built.method(), reqwest::Method::GET);
        assert_eq!(built.url().query(), Some("token=page-3"));
    }

    #[test]
    fn test_parse_stac_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2021, 4, 22);
        assert_eq!(parse_stac_date("2021-04-22T00:00:00Z"), expected);
        assert_eq!(parse_stac_date("2021-04-22T00:00:00.000+02:00"), expected);
        assert_eq!(parse_stac_date("2021-04-22"), expected);
        assert_eq!(parse_stac_date("garbage"), None);
    }

    #[test]
    fn test_unsigned_locator_is_returned_as_is() -> Result<(), CatalogError> {
        let catalog = StacCatalog::new(Client::new(), "https://example.org/stac", None, 100);
        assert_eq!(
            catalog.resolve_asset_locator("https://example.org/a.tif")?,
            "https://example.org/a.tif"
        );
        Ok(())
    }

    #[test]
    #[ignore = "requires network access to the Planetary Computer"]
    fn test_live_copernicus_dem_search() -> Result<(), CatalogError> {
        let catalog = StacCatalog::new(
            Client::new(),
            crate::config::DEFAULT_CATALOG_URL,
            Some(crate::config::DEFAULT_SIGNING_URL.to_string()),
            100,
        );
        let mut req = request(NamingConvention::CopernicusDem, "data");
        req.collection_id = "cop-dem-glo-30".to_string();
        req.extent = SpatialExtent::new(8.4, 47.3, 8.6, 47.4).unwrap();
        let tiles = catalog.search(&req)?;
        assert!(tiles.iter().any(|t| t.tile_id == "N47E008"));
        let signed = catalog.resolve_asset_locator(&tiles[0].asset_href)?;
        catalog.check_asset(&signed)?;
        Ok(())
    }
}
