//! # BeatsChain Common Library
//!
//! Shared code for BeatsChain services including:
//! - Catalog data model (producers and beats)
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{Beat, Producer};
