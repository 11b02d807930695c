use crate::fetch::error::FetchError;
use crate::fetch::retry::Transient;
use crate::types::descriptor::{list_failures, TileFailure};
use crate::types::extent::SpatialExtent;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse JSON response from {0}")]
    JsonParse(String, #[source] serde_json::Error),

    #[error("Malformed catalog response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("Cannot read a date and tile from item '{item_id}' using the {convention} naming convention")]
    UnreadableIdentifier {
        item_id: String,
        convention: &'static str,
    },

    #[error("Failed to write asset to '{0}'")]
    FileWrite(PathBuf, #[source] std::io::Error),
}

impl Transient for CatalogError {
    fn is_transient(&self) -> bool {
        match self {
            CatalogError::NetworkRequest(_, e) => {
                e.is_timeout() || e.is_connect() || e.is_body()
            }
            CatalogError::HttpStatus { status, .. } => {
                status.is_server_error()
                    || *status == reqwest::StatusCode::REQUEST_TIMEOUT
                    || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("No collection{} exposes variable '{variable}'", family_label(.family))]
    VariableNotFound {
        variable: String,
        family: Option<String>,
    },

    #[error("Failed to list catalog collections")]
    Catalog(#[source] FetchError<CatalogError>),
}

fn family_label(family: &Option<String>) -> String {
    family
        .as_ref()
        .map(|f| format!(" in family '{}'", f))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("No tiles of '{collection}' match extent {extent} and time range {time_range}")]
    NoDataFound {
        collection: String,
        extent: SpatialExtent,
        time_range: String,
    },

    #[error("Catalog search failed")]
    Search(#[source] FetchError<CatalogError>),

    #[error("{} assets are unreachable: {}", .0.len(), list_failures(.0))]
    UnreachableAssets(Vec<TileFailure>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{connect_error, status_error};

    fn http_status(code: u16) -> CatalogError {
        let source = status_error(code);
        CatalogError::HttpStatus {
            url: "https://catalog.test/search".to_string(),
            status: reqwest::StatusCode::from_u16(code).unwrap(),
            source,
        }
    }

    #[test]
    fn test_throttling_and_server_errors_are_transient() {
        for code in [408, 429, 500, 502, 503] {
            assert!(http_status(code).is_transient(), "{} should be retried", code);
        }
        assert!(connect_error("https://catalog.test").is_transient());
    }

    #[test]
    fn test_client_errors_are_permanent() {
        for code in [400, 401, 403, 404, 422] {
            assert!(!http_status(code).is_transient(), "{} should not be retried", code);
        }
    }

    #[test]
    fn test_malformed_request_is_permanent() {
        let error = reqwest::blocking::Client::new()
            .get("not a url")
            .send()
            .unwrap_err();
        assert!(!CatalogError::NetworkRequest("not a url".to_string(), error).is_transient());
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!CatalogError::JsonParse("https://catalog.test".to_string(), parse).is_transient());
    }
}
