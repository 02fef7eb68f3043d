//! critstore-lib: Safe storage for gaming-device critical data
//!
//! This crate provides the building blocks of the critical data store:
//! - `RecordStore`: in-memory sections of scopes of named binary records
//! - `Codec`: value and whole-store serialization strategies
//! - `PersistenceManager`: double-buffered commit and crash recovery
//! - `ScopeIndexer`: maps data categories and registry identifiers to coordinates
//! - `CriticalDataAccessor`: validated client-facing read/write/remove façade

pub mod access;
pub mod codec;
pub mod config;
pub mod consts;
pub mod index;
pub mod paths;
pub mod persist;
pub mod store;
