//! Endpoints Core - URL building, payloads, field mapping and publishing logic.
//!
//! This crate holds everything that does not talk to the network directly:
//!
//! - [`urls`] builds Carto SQL API export URLs
//! - [`payload`] turns URLs into Knack records and CKAN resources
//! - [`fields`] renames payload keys to Knack field ids
//! - [`publish`] drives a [`RecordStore`] or [`PackageCatalog`] implementation

pub mod config;
pub mod error;
pub mod fields;
pub mod models;
pub mod payload;
pub mod publish;
pub mod traits;
pub mod urls;

pub use config::{CartoConfig, CkanConfig, HttpConfig, KnackConfig, DEFAULT_KNACK_API_URL};
pub use error::AppError;
pub use fields::{FieldMap, LogicalField};
pub use models::{CkanPackage, CkanResource, EndpointPayload, ExportFormat, ExportSpec};
pub use publish::{
    merge_resources, BennyPublisher, CkanPublishReport, CkanPublisher, EndpointResult,
    PreparedPackage, PreparedRecord, PublishSummary, ResourceFilter,
};
pub use traits::{PackageCatalog, RecordStore};
pub use urls::build_url;
