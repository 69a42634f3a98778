//! # todotracker-storage
//!
//! Filesystem storage for attachment files plus the validation helpers
//! for untrusted uploads: filename sanitization, extension checks, and
//! magic-byte content signature verification.

pub mod mime;
pub mod sanitize;
pub mod signature;
pub mod store;

pub use store::AttachmentStore;
