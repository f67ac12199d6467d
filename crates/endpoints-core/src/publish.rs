//! Publishing logic for the Knack and CKAN catalogs.
//!
//! Publishers are generic over the [`RecordStore`] and [`PackageCatalog`]
//! traits and issue every call sequentially. Knack records are independent:
//! a rejected record is recorded in the summary and the remaining records are
//! still attempted. A CKAN republish is a single package update and either
//! succeeds or fails as a whole.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::CartoConfig;
use crate::error::AppError;
use crate::fields::FieldMap;
use crate::models::{CkanPackage, CkanResource, ExportFormat};
use crate::payload::{ckan_resources, endpoint_payloads};
use crate::traits::{PackageCatalog, RecordStore};

/// Marker of resources pointing at the retired data.phila.gov host.
pub const LEGACY_HOST_MARKER: &str = "//data.phila.gov";

/// Marker of resources pointing at the retired Carto API explorer page.
pub const STALE_EXPLORER_MARKER: &str = "carto-api-explorer";

// =============================================================================
// Knack
// =============================================================================

/// Result of creating one Knack endpoint record.
#[derive(Debug, Clone)]
pub struct EndpointResult {
    pub format: ExportFormat,
    /// Error message if the record was not created, None if successful.
    pub error: Option<String>,
}

impl EndpointResult {
    pub fn created(format: ExportFormat) -> Self {
        Self {
            format,
            error: None,
        }
    }

    pub fn failed(format: ExportFormat, error: String) -> Self {
        Self {
            format,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated results of publishing a representation's endpoints.
#[derive(Debug, Clone, Default)]
pub struct PublishSummary {
    pub representation_id: String,
    pub results: Vec<EndpointResult>,
}

impl PublishSummary {
    pub fn new(representation_id: impl Into<String>) -> Self {
        Self {
            representation_id: representation_id.into(),
            results: Vec::new(),
        }
    }

    pub fn add(&mut self, result: EndpointResult) {
        self.results.push(result);
    }

    pub fn created_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }

    /// Returns true if every record was created.
    pub fn all_created(&self) -> bool {
        self.failed_count() == 0
    }
}

/// A Knack record ready to send, keyed by Knack field ids.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    pub format: ExportFormat,
    pub record: Map<String, Value>,
}

/// Creates endpoint records linked to a Knack representation.
pub struct BennyPublisher<'a, S: RecordStore> {
    store: &'a S,
    carto: &'a CartoConfig,
    fields: &'a FieldMap,
}

impl<'a, S: RecordStore> BennyPublisher<'a, S> {
    pub fn new(store: &'a S, carto: &'a CartoConfig, fields: &'a FieldMap) -> Self {
        Self {
            store,
            carto,
            fields,
        }
    }

    /// Builds and maps every record without sending anything.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnmappedField` if a payload key has no Knack field.
    /// Nothing is sent when this fails.
    pub fn prepare(
        &self,
        table: &str,
        representation_id: &str,
        geospatial: bool,
    ) -> Result<Vec<PreparedRecord>, AppError> {
        endpoint_payloads(table, representation_id, geospatial, self.carto)
            .into_iter()
            .map(|payload| {
                let record = self.fields.map_fields(&payload.to_map()?)?;
                Ok(PreparedRecord {
                    format: payload.format,
                    record,
                })
            })
            .collect()
    }

    /// Creates one record per requested format.
    ///
    /// Rejections are collected in the returned summary rather than aborting
    /// the run.
    ///
    /// # Errors
    ///
    /// Only configuration errors from [`prepare`](Self::prepare) are returned.
    pub async fn publish(
        &self,
        table: &str,
        representation_id: &str,
        geospatial: bool,
    ) -> Result<PublishSummary, AppError> {
        let records = self.prepare(table, representation_id, geospatial)?;
        let total = records.len();
        info!(
            "Creating {} endpoints for table {} on representation {}",
            total, table, representation_id
        );

        let mut summary = PublishSummary::new(representation_id);
        for (i, prepared) in records.into_iter().enumerate() {
            match self.store.create_record(&prepared.record).await {
                Ok(()) => {
                    debug!(
                        "[{}/{}] Created {} endpoint on representation {}",
                        i + 1,
                        total,
                        prepared.format,
                        representation_id
                    );
                    summary.add(EndpointResult::created(prepared.format));
                }
                Err(e) => {
                    debug!(
                        "[{}/{}] Failed to create {} endpoint: {}",
                        i + 1,
                        total,
                        prepared.format,
                        e
                    );
                    summary.add(EndpointResult::failed(prepared.format, e.to_string()));
                }
            }
        }

        info!(
            "{} of {} endpoints created on representation {}",
            summary.created_count(),
            total,
            representation_id
        );
        Ok(summary)
    }
}

// =============================================================================
// CKAN
// =============================================================================

/// Decides which existing resources are dropped on republish.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    markers: Vec<String>,
}

impl ResourceFilter {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the resource URL contains any stale marker.
    pub fn is_stale(&self, resource: &CkanResource) -> bool {
        let url = resource.url();
        self.markers.iter().any(|marker| url.contains(marker.as_str()))
    }
}

impl Default for ResourceFilter {
    fn default() -> Self {
        Self::new([LEGACY_HOST_MARKER, STALE_EXPLORER_MARKER])
    }
}

/// Puts new resources first, followed by the existing ones that are not stale.
///
/// Returns the merged list and the number of resources dropped.
///
/// # Examples
///
/// ```
/// use endpoints_core::models::CkanResource;
/// use endpoints_core::publish::{merge_resources, ResourceFilter};
///
/// let res = |url: &str| CkanResource {
///     format: None,
///     name: None,
///     url: Some(url.to_string()),
///     extras: Default::default(),
/// };
///
/// let (merged, removed) = merge_resources(
///     vec![res("https://carto.example/new")],
///     vec![res("https://data.phila.gov/old"), res("https://example.org/keep")],
///     &ResourceFilter::default(),
/// );
/// assert_eq!(removed, 1);
/// assert_eq!(merged[0].url(), "https://carto.example/new");
/// assert_eq!(merged[1].url(), "https://example.org/keep");
/// ```
pub fn merge_resources(
    new: Vec<CkanResource>,
    existing: Vec<CkanResource>,
    filter: &ResourceFilter,
) -> (Vec<CkanResource>, usize) {
    let before = existing.len();
    let kept: Vec<_> = existing
        .into_iter()
        .filter(|resource| {
            let stale = filter.is_stale(resource);
            if stale {
                debug!("Dropping stale resource {}", resource.url());
            }
            !stale
        })
        .collect();
    let removed = before - kept.len();

    let mut merged = new;
    merged.extend(kept);
    (merged, removed)
}

/// A package with its merged resource list, ready for `package_update`.
#[derive(Debug, Clone)]
pub struct PreparedPackage {
    pub package: CkanPackage,
    pub created: usize,
    pub removed: usize,
}

/// Outcome of a CKAN republish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CkanPublishReport {
    pub slug: String,
    pub title: String,
    pub created: usize,
    pub removed: usize,
    pub total_resources: usize,
}

/// Replaces a CKAN package's Carto resources with freshly built ones.
pub struct CkanPublisher<'a, C: PackageCatalog> {
    catalog: &'a C,
    carto: &'a CartoConfig,
    filter: ResourceFilter,
}

impl<'a, C: PackageCatalog> CkanPublisher<'a, C> {
    pub fn new(catalog: &'a C, carto: &'a CartoConfig) -> Self {
        Self {
            catalog,
            carto,
            filter: ResourceFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ResourceFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Fetches the package and builds its new resource list without updating it.
    pub async fn prepare(
        &self,
        table: &str,
        slug: &str,
        geospatial: bool,
    ) -> Result<PreparedPackage, AppError> {
        info!("Fetching CKAN package {}", slug);
        let mut package = self.catalog.show_package(slug).await?;

        let new = ckan_resources(&package.title, table, geospatial, self.carto);
        let created = new.len();
        let existing = std::mem::take(&mut package.resources);
        let (merged, removed) = merge_resources(new, existing, &self.filter);
        package.resources = merged;

        Ok(PreparedPackage {
            package,
            created,
            removed,
        })
    }

    /// Republishes the package with the new resources in front.
    ///
    /// # Errors
    ///
    /// Any failure fetching or updating the package is returned as is; the
    /// package is either fully updated or left untouched.
    pub async fn publish(
        &self,
        table: &str,
        slug: &str,
        geospatial: bool,
    ) -> Result<CkanPublishReport, AppError> {
        let prepared = self.prepare(table, slug, geospatial).await?;
        let updated = self.catalog.update_package(&prepared.package).await?;

        info!(
            "Created {} resources on slug {} ({} stale removed)",
            prepared.created, slug, prepared.removed
        );

        Ok(CkanPublishReport {
            slug: slug.to_string(),
            title: updated.title,
            created: prepared.created,
            removed: prepared.removed,
            total_resources: updated.resources.len(),
        })
    }
}
