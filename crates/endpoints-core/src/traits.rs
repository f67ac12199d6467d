//! Seams between the publishing logic and the remote catalogs.
//!
//! The HTTP implementations live in `endpoints-client`; tests use in-memory
//! implementations.

use std::future::Future;

use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::CkanPackage;

/// A catalog that stores endpoint records (Knack).
pub trait RecordStore: Send + Sync {
    /// Creates one record from a payload whose keys are already Knack field ids.
    ///
    /// Returns `AppError::RecordRejected` when the catalog answers with
    /// anything other than HTTP 200.
    fn create_record(
        &self,
        record: &Map<String, Value>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// A catalog of dataset packages (CKAN).
pub trait PackageCatalog: Send + Sync {
    /// Fetches a package by id or slug.
    fn show_package(&self, slug: &str)
        -> impl Future<Output = Result<CkanPackage, AppError>> + Send;

    /// Replaces a package with the given one, resources included.
    fn update_package(
        &self,
        package: &CkanPackage,
    ) -> impl Future<Output = Result<CkanPackage, AppError>> + Send;
}
