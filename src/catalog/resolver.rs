use crate::catalog::error::ResolutionError;
use crate::catalog::CatalogClient;
use crate::fetch::retry::RetryingFetcher;
use crate::types::descriptor::CollectionDescriptor;
use log::info;

/// The collection chosen for a variable, plus any other candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub selected: CollectionDescriptor,
    /// Other matching collections, in catalog order.
    pub alternatives: Vec<CollectionDescriptor>,
}

impl Resolution {
    pub fn is_ambiguous(&self) -> bool {
        !self.alternatives.is_empty()
    }
}

/// Picks the collection exposing `variable` among `collections`.
///
/// Only ids starting with `family_prefix` are considered when one is given.
/// Several matches select the first in catalog order.
pub fn select_collection(
    collections: Vec<CollectionDescriptor>,
    variable: &str,
    family_prefix: Option<&str>,
) -> Result<Resolution, ResolutionError> {
    let mut matches = collections
        .into_iter()
        .filter(|c| family_prefix.map_or(true, |prefix| c.id.starts_with(prefix)))
        .filter(|c| c.exposes(variable));
    let selected = matches
        .next()
        .ok_or_else(|| ResolutionError::VariableNotFound {
            variable: variable.to_string(),
            family: family_prefix.map(str::to_string),
        })?;
    Ok(Resolution {
        selected,
        alternatives: matches.collect(),
    })
}

/// Maps variable names to catalog collections.
pub struct CollectionResolver<'a> {
    catalog: &'a dyn CatalogClient,
    fetcher: &'a RetryingFetcher<'a>,
}

impl<'a> CollectionResolver<'a> {
    pub fn new(catalog: &'a dyn CatalogClient, fetcher: &'a RetryingFetcher<'a>) -> Self {
        Self { catalog, fetcher }
    }

    /// Lists the catalog's collections once and selects the one exposing
    /// `variable`.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::VariableNotFound`] when no collection matches,
    /// [`ResolutionError::Catalog`] when the collection index cannot be fetched.
    pub fn resolve(
        &self,
        variable: &str,
        family_prefix: Option<&str>,
    ) -> Result<Resolution, ResolutionError> {
        let collections = self
            .fetcher
            .attempt("listing collections", || self.catalog.list_collections())
            .map_err(ResolutionError::Catalog)?;
        let resolution = select_collection(collections, variable, family_prefix)?;
        if resolution.is_ambiguous() {
            let names: Vec<&str> = std::iter::once(&resolution.selected)
                .chain(&resolution.alternatives)
                .map(|c| c.id.as_str())
                .collect();
            info!(
                "Variable '{}' is exposed by {} collections ({}), using '{}'",
                variable,
                names.len(),
                names.join(", "),
                resolution.selected.id
            );
        } else {
            info!(
                "Variable '{}' resolved to collection '{}'",
                variable, resolution.selected.id
            );
        }
        Ok(resolution)
    }
}
