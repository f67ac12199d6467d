//! Carto Endpoints CLI - command-line interface for publishing Carto export endpoints
//!
//! This crate provides the CLI application that ties the core logic and the
//! catalog clients together.

pub mod config;
pub mod output;

pub use config::{Command, Config};
