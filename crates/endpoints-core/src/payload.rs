//! Payload construction for both catalogs.

use serde_json::{Map, Value};

use crate::config::CartoConfig;
use crate::error::AppError;
use crate::models::{CkanResource, EndpointPayload, ExportFormat, ExportSpec, LinkField};
use crate::urls::build_url;

/// Datastore tag recorded on every Knack endpoint.
pub const DATASTORE: &str = "Carto";

/// Formats to publish for a table, in publishing order.
///
/// CSV always comes first and API documentation last; GeoJSON and SHP are
/// only offered for geospatial tables.
///
/// # Examples
///
/// ```
/// use endpoints_core::models::ExportFormat;
/// use endpoints_core::payload::requested_formats;
///
/// assert_eq!(
///     requested_formats(false),
///     vec![ExportFormat::Csv, ExportFormat::ApiDocumentation]
/// );
/// assert_eq!(requested_formats(true).len(), 4);
/// ```
pub fn requested_formats(geospatial: bool) -> Vec<ExportFormat> {
    let mut formats = vec![ExportFormat::Csv];
    if geospatial {
        formats.extend([ExportFormat::GeoJson, ExportFormat::Shp]);
    }
    formats.push(ExportFormat::ApiDocumentation);
    formats
}

impl EndpointPayload {
    pub fn new(
        table: &str,
        representation_id: &str,
        format: ExportFormat,
        geospatial: bool,
        carto: &CartoConfig,
    ) -> Self {
        Self {
            format,
            url: LinkField {
                url: build_url(&ExportSpec::new(table, format, geospatial), carto),
            },
            datastore: DATASTORE,
            representation: vec![representation_id.to_string()],
        }
    }

    /// The payload as a JSON object keyed by logical field names.
    pub fn to_map(&self) -> Result<Map<String, Value>, AppError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::Generic(format!(
                "Endpoint payload serialized to a non-object: {}",
                other
            ))),
        }
    }
}

/// One payload per requested format for a Knack representation.
pub fn endpoint_payloads(
    table: &str,
    representation_id: &str,
    geospatial: bool,
    carto: &CartoConfig,
) -> Vec<EndpointPayload> {
    requested_formats(geospatial)
        .into_iter()
        .map(|format| EndpointPayload::new(table, representation_id, format, geospatial, carto))
        .collect()
}

impl CkanResource {
    /// A new resource for a CKAN dataset, named `"<title> (<format>)"`.
    pub fn for_export(
        title: &str,
        table: &str,
        format: ExportFormat,
        geospatial: bool,
        carto: &CartoConfig,
    ) -> Self {
        Self {
            format: Some(format.label().to_string()),
            name: Some(format!("{} ({})", title, format)),
            url: Some(build_url(&ExportSpec::new(table, format, geospatial), carto)),
            extras: Map::new(),
        }
    }
}

/// One new resource per requested format for a CKAN dataset.
pub fn ckan_resources(
    title: &str,
    table: &str,
    geospatial: bool,
    carto: &CartoConfig,
) -> Vec<CkanResource> {
    requested_formats(geospatial)
        .into_iter()
        .map(|format| CkanResource::for_export(title, table, format, geospatial, carto))
        .collect()
}
