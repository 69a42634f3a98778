//! # todotracker-cache
//!
//! A single-snapshot in-memory cache with TTL, used for the rarely
//! changing priority reference data.

pub mod snapshot;

pub use snapshot::SnapshotCache;
