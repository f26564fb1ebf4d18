//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the catalog crates:
//! - Logging and tracing initialisation
//! - Configuration loading and validation
//!
//! ## Overview
//!
//! Nothing in here knows about books. The catalog core only emits `tracing`
//! events; this crate decides where they go and which store the catalog opens.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CatalogConfig, CatalogConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
