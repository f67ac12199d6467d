//! Endpoints Client - HTTP clients for the catalogs
//!
//! This crate provides HTTP clients for interacting with:
//!
//! - [`knack`] - the Knack records API (endpoint records)
//! - [`ckan`] - CKAN open data portals (dataset packages)
//!
//! # Overview
//!
//! Both clients implement the traits from `endpoints_core::traits`, handling
//! authentication headers, request building, response parsing, and error
//! mapping. Neither client retries.

pub mod ckan;
mod http;
pub mod knack;

// Re-export main client types
pub use ckan::CkanClient;
pub use knack::KnackClient;
