//! # autodb-core
//!
//! Shared types for the AutoDB relay: process configuration and the
//! validated schema-name type.
//!
//! Configuration is loaded once at startup from a YAML file (plus CLI/env
//! overrides applied by the binary) and is immutable afterwards — it is the
//! only state shared across relay sessions.

pub mod config;
pub mod schema;

pub use config::{AdminConfig, AutoDbConfig, ConfigError, ListenConfig, UpstreamConfig};
pub use schema::{SchemaName, SchemaNameError};
