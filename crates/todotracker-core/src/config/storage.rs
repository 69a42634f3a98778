//! Attachment storage configuration.

use serde::{Deserialize, Serialize};

/// Attachment storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory where attachment files are written.
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: String,
    /// Maximum upload size in bytes (default 10 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// File extensions accepted for upload (lowercase, without the dot).
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            attachments_dir: default_attachments_dir(),
            max_upload_size_bytes: default_max_upload(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl StorageConfig {
    /// The upload size limit expressed in megabytes, for error messages.
    pub fn max_upload_size_mb(&self) -> f64 {
        self.max_upload_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

fn default_attachments_dir() -> String {
    "data/attachments".to_string()
}

fn default_max_upload() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    [
        // Documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "txt", "rtf",
        "csv",
        // Images
        "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "ico",
        // Archives
        "zip", "tar", "gz", "7z", "rar",
        // Other common formats
        "json", "xml", "yaml", "yml", "md", "html", "css",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
