use clap::{Parser, Subcommand};
use endpoints_core::config::{
    require, CartoConfig, CkanConfig, HttpConfig, KnackConfig, DEFAULT_KNACK_API_URL,
};
use endpoints_core::error::AppError;
use endpoints_core::fields::{FieldMap, LogicalField};

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "carto-endpoints")]
#[command(
    author,
    version,
    about = "Registers Carto export endpoints in Knack (Benny) and CKAN"
)]
#[command(after_help = "Examples:
  carto-endpoints benny incidents_part1_part2 61f2a3 --geospatial
  carto-endpoints ckan li_permits li-permits
  carto-endpoints push_ckan_and_benny parcels parcels 61f2a3 --geospatial
  carto-endpoints --dry-run benny parcels 61f2a3")]
pub struct Config {
    /// Knack application id
    #[arg(long, env = "KNACK_APPLICATION_ID", global = true, hide_env_values = true)]
    pub knack_application_id: Option<String>,

    /// Knack REST API key
    #[arg(long, env = "KNACK_API_KEY", global = true, hide_env_values = true)]
    pub knack_api_key: Option<String>,

    /// Knack object number holding endpoint records
    #[arg(long, env = "KNACK_TABLE", global = true)]
    pub knack_table: Option<String>,

    /// Knack field number of the representation connection
    #[arg(long, env = "KNACK_FIELD_REPRESENTATION", global = true)]
    pub knack_field_representation: Option<String>,

    /// Knack field number of the endpoint URL
    #[arg(long, env = "KNACK_FIELD_URL", global = true)]
    pub knack_field_url: Option<String>,

    /// Knack field number of the endpoint format
    #[arg(long, env = "KNACK_FIELD_FORMAT", global = true)]
    pub knack_field_format: Option<String>,

    /// Knack field number of the datastore tag
    #[arg(long, env = "KNACK_FIELD_DATASTORE", global = true)]
    pub knack_field_datastore: Option<String>,

    /// Base URL of the Knack REST API
    #[arg(long, env = "KNACK_API_URL", global = true, default_value = DEFAULT_KNACK_API_URL)]
    pub knack_api_url: String,

    /// Carto SQL API endpoint, e.g. https://phl.carto.com/api/v2/sql
    #[arg(long, env = "CARTO_ENDPOINT", global = true)]
    pub carto_endpoint: Option<String>,

    /// Base URL of the API documentation page
    #[arg(long, env = "API_DOCS_ENDPOINT", global = true)]
    pub api_docs_endpoint: Option<String>,

    /// CKAN portal URL
    #[arg(long, env = "CKAN_HOST", global = true)]
    pub ckan_host: Option<String>,

    /// CKAN API key
    #[arg(long, env = "CKAN_API_KEY", global = true, hide_env_values = true)]
    pub ckan_api_key: Option<String>,

    /// Timeout for each HTTP request, in seconds (at least 1)
    #[arg(
        long,
        env = "HTTP_TIMEOUT_SECS",
        global = true,
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub http_timeout_secs: u64,

    /// Print the payloads instead of sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Creates endpoints associated with a representation (aka view/version) in Benny
    Benny {
        /// Carto table name
        carto_table: String,
        /// Knack record id of the representation
        representation_id: String,
        /// Include GeoJSON and SHP endpoints
        #[arg(long)]
        geospatial: bool,
    },
    /// Creates endpoints associated with a dataset in CKAN
    Ckan {
        /// Carto table name
        carto_table: String,
        /// CKAN dataset slug
        ckan_slug: String,
        /// Include GeoJSON and SHP endpoints
        #[arg(long)]
        geospatial: bool,
    },
    /// Runs `ckan` and then `benny` for the same table
    #[command(name = "push_ckan_and_benny", alias = "push-ckan-and-benny")]
    PushCkanAndBenny {
        /// Carto table name
        carto_table: String,
        /// CKAN dataset slug
        ckan_slug: String,
        /// Knack record id of the representation
        representation_id: String,
        /// Include GeoJSON and SHP endpoints
        #[arg(long)]
        geospatial: bool,
    },
}

impl Config {
    pub fn carto_config(&self) -> Result<CartoConfig, AppError> {
        CartoConfig::new(
            require(self.carto_endpoint.as_deref(), "CARTO_ENDPOINT")?,
            require(self.api_docs_endpoint.as_deref(), "API_DOCS_ENDPOINT")?,
        )
    }

    /// Builds the Knack configuration, failing on the first unset value.
    pub fn knack_config(&self) -> Result<KnackConfig, AppError> {
        let application_id = require(self.knack_application_id.as_deref(), "KNACK_APPLICATION_ID")?;
        let api_key = require(self.knack_api_key.as_deref(), "KNACK_API_KEY")?;
        let object_id = require(self.knack_table.as_deref(), "KNACK_TABLE")?;

        let fields = FieldMap::from_numbers(|field| match field {
            LogicalField::Representation => self.knack_field_representation.as_deref(),
            LogicalField::Url => self.knack_field_url.as_deref(),
            LogicalField::Format => self.knack_field_format.as_deref(),
            LogicalField::Datastore => self.knack_field_datastore.as_deref(),
        })?;

        KnackConfig::new(
            application_id,
            api_key,
            object_id,
            &self.knack_api_url,
            fields,
        )
    }

    pub fn ckan_config(&self) -> Result<CkanConfig, AppError> {
        CkanConfig::new(
            require(self.ckan_host.as_deref(), "CKAN_HOST")?,
            require(self.ckan_api_key.as_deref(), "CKAN_API_KEY")?,
        )
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::with_timeout_secs(self.http_timeout_secs)
    }
}
