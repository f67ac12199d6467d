use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output format of a Carto export endpoint.
///
/// The serialized form is the human-readable label that both catalogs store
/// in their `format` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "GeoJSON")]
    GeoJson,
    #[serde(rename = "SHP")]
    Shp,
    #[serde(rename = "API Documentation")]
    ApiDocumentation,
}

impl ExportFormat {
    /// Label stored in the catalogs (`CSV`, `GeoJSON`, `SHP`, `API Documentation`).
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::GeoJson => "GeoJSON",
            ExportFormat::Shp => "SHP",
            ExportFormat::ApiDocumentation => "API Documentation",
        }
    }

    /// Value of the Carto `format` query parameter.
    ///
    /// `None` for API documentation, which is not a Carto query.
    pub fn query_format(self) -> Option<&'static str> {
        match self {
            ExportFormat::Csv => Some("csv"),
            ExportFormat::GeoJson => Some("geojson"),
            ExportFormat::Shp => Some("shp"),
            ExportFormat::ApiDocumentation => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything needed to build one export URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpec {
    pub table: String,
    pub format: ExportFormat,
    pub geospatial: bool,
}

impl ExportSpec {
    pub fn new(table: impl Into<String>, format: ExportFormat, geospatial: bool) -> Self {
        Self {
            table: table.into(),
            format,
            geospatial,
        }
    }
}

/// Knack link field value: the URL sits one level down under `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkField {
    pub url: String,
}

/// One endpoint record for the Knack catalog, keyed by logical field names.
///
/// Field names are translated to Knack's `field_N` identifiers by
/// [`FieldMap`](crate::fields::FieldMap) before sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointPayload {
    pub format: ExportFormat,
    pub url: LinkField,
    pub datastore: &'static str,
    /// Connection fields in Knack are always arrays, even with one element.
    pub representation: Vec<String>,
}

/// A resource entry of a CKAN package.
///
/// Resources fetched from CKAN keep every field they came with in `extras`,
/// so a republish does not lose ids, timestamps or descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkanResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl CkanResource {
    /// The resource URL, or an empty string when CKAN has none.
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

/// A CKAN dataset package as returned by `package_show`.
///
/// Only the fields the publisher reads are typed; the rest is carried through
/// `extras` and sent back untouched by `package_update`.
///
/// # Examples
///
/// ```
/// use endpoints_core::models::CkanPackage;
///
/// let json = r#"{
///     "id": "abc-123",
///     "name": "crime-incidents",
///     "title": "Crime Incidents",
///     "notes": "Part I and II offenses",
///     "resources": [{"url": "https://example.org/a.csv", "format": "CSV"}]
/// }"#;
///
/// let package: CkanPackage = serde_json::from_str(json).unwrap();
/// assert_eq!(package.title, "Crime Incidents");
/// assert_eq!(package.resources.len(), 1);
/// assert!(package.extras.contains_key("notes"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkanPackage {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub resources: Vec<CkanResource>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}
