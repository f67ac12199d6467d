//! Carto SQL API export URLs.
//!
//! URLs are assembled by plain string interpolation. The only encoding step is
//! replacing spaces in the SQL query with `+`; existing consumers of these
//! URLs depend on that exact shape, so no general percent-encoding is applied.

use crate::config::CartoConfig;
use crate::models::{ExportFormat, ExportSpec};

/// Columns Carto adds to every table.
const SKIP_INTERNAL: &str = "cartodb_id";

/// Internal columns plus the geometry columns, for tabular-only exports.
const SKIP_INTERNAL_AND_GEOMETRY: &str = "cartodb_id,the_geom,the_geom_webmercator";

/// Builds the export URL for one table and format.
///
/// # Examples
///
/// ```
/// use endpoints_core::config::CartoConfig;
/// use endpoints_core::models::{ExportFormat, ExportSpec};
/// use endpoints_core::urls::build_url;
///
/// let carto = CartoConfig::new("https://carto.example/sql", "https://docs.example/").unwrap();
/// let url = build_url(&ExportSpec::new("crime_incidents", ExportFormat::Csv, false), &carto);
/// assert_eq!(
///     url,
///     "https://carto.example/sql?q=SELECT+*+FROM+crime_incidents&filename=crime_incidents&format=csv&skipfields=cartodb_id,the_geom,the_geom_webmercator"
/// );
/// ```
pub fn build_url(spec: &ExportSpec, carto: &CartoConfig) -> String {
    match spec.format {
        ExportFormat::Csv => csv_url(&spec.table, spec.geospatial, carto),
        ExportFormat::ApiDocumentation => api_docs_url(&spec.table, carto),
        ExportFormat::GeoJson | ExportFormat::Shp => {
            let query = select_all(&spec.table);
            query_url(carto, &query, &spec.table, spec.format, SKIP_INTERNAL)
        }
    }
}

fn csv_url(table: &str, geospatial: bool, carto: &CartoConfig) -> String {
    if geospatial {
        let query = format!(
            "SELECT *, ST_Y(the_geom) AS lat, ST_X(the_geom) AS lng FROM {}",
            table
        );
        query_url(carto, &query, table, ExportFormat::Csv, SKIP_INTERNAL)
    } else {
        query_url(
            carto,
            &select_all(table),
            table,
            ExportFormat::Csv,
            SKIP_INTERNAL_AND_GEOMETRY,
        )
    }
}

fn api_docs_url(table: &str, carto: &CartoConfig) -> String {
    format!("{}#{}", carto.api_docs_endpoint, table)
}

fn select_all(table: &str) -> String {
    format!("SELECT * FROM {}", table)
}

fn query_url(
    carto: &CartoConfig,
    query: &str,
    table: &str,
    format: ExportFormat,
    skipfields: &str,
) -> String {
    format!(
        "{}?q={}&filename={}&format={}&skipfields={}",
        carto.sql_endpoint,
        query.replace(' ', "+"),
        table,
        format.query_format().unwrap_or_default(),
        skipfields
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carto() -> CartoConfig {
        CartoConfig::new(
            "https://carto.example/sql",
            "https://docs.example/carto",
        )
        .unwrap()
    }

    fn url(table: &str, format: ExportFormat, geospatial: bool) -> String {
        build_url(&ExportSpec::new(table, format, geospatial), &carto())
    }

    #[test]
    fn test_csv_tabular() {
        let u = url("crime_incidents", ExportFormat::Csv, false);
        assert_eq!(
            u,
            "https://carto.example/sql?q=SELECT+*+FROM+crime_incidents&filename=crime_incidents&format=csv&skipfields=cartodb_id,the_geom,the_geom_webmercator"
        );
    }

    #[test]
    fn test_csv_geospatial_adds_lat_lng() {
        let u = url("parcels", ExportFormat::Csv, true);
        assert!(u.contains("q=SELECT+*,+ST_Y(the_geom)+AS+lat,+ST_X(the_geom)+AS+lng+FROM+parcels"));
        assert!(u.ends_with("&skipfields=cartodb_id"));
        assert!(!u.contains("the_geom_webmercator"));
    }

    #[test]
    fn test_geojson_and_shp() {
        let geojson = url("parcels", ExportFormat::GeoJson, true);
        assert_eq!(
            geojson,
            "https://carto.example/sql?q=SELECT+*+FROM+parcels&filename=parcels&format=geojson&skipfields=cartodb_id"
        );

        let shp = url("parcels", ExportFormat::Shp, true);
        assert!(shp.contains("&format=shp&"));
        assert!(shp.ends_with("skipfields=cartodb_id"));
    }

    #[test]
    fn test_api_docs_ignores_geospatial_flag() {
        let expected = "https://docs.example/carto#parcels";
        assert_eq!(url("parcels", ExportFormat::ApiDocumentation, true), expected);
        assert_eq!(url("parcels", ExportFormat::ApiDocumentation, false), expected);
    }

    #[test]
    fn test_only_spaces_are_encoded() {
        // Anything else in the table name passes through untouched.
        let u = url("schema.t&x", ExportFormat::GeoJson, false);
        assert!(u.contains("q=SELECT+*+FROM+schema.t&x&filename=schema.t&x&"));
    }
}
