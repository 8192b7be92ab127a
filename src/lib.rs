//! # Brocade Registry
//!
//! File-backed key-value registry for Brocade process configuration.
//!
//! The registry is a flat JSON object of string settings persisted in a file
//! whose path comes from the `BROCADE_REGISTRY` environment variable. A
//! process loads it once at startup, reads values by key, and persists
//! changes through [`Registry::set`] and [`Registry::init_if_absent`], both
//! of which re-read, merge, and atomically replace the backing file.

mod atomic;
mod error;
mod store;

pub use error::RegistryError;
pub use store::{
    DEFAULT_SCHEMA_URI, KEY_ERROR, KEY_REGISTRY_FILE, KEY_SCHEMA, REGISTRY_ENV_VAR, Registry,
};
