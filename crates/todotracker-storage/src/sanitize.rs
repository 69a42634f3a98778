//! Sanitization of untrusted, client-supplied filenames.

use todotracker_core::error::AppError;
use todotracker_core::result::AppResult;

/// Characters rejected across common filesystems (slashes are handled
/// separately as directory separators).
const ILLEGAL_CHARS: [char; 6] = ['<', '>', ':', '"', '|', '?'];

/// Sanitize a client-supplied filename.
///
/// Strips any directory components (both `/` and `\` separated, since the
/// browser-supplied name is attacker-controlled), removes characters that
/// are illegal on common filesystems, and rejects names that end up empty
/// or are exactly `.` or `..`.
pub fn sanitize_filename(raw: &str) -> AppResult<String> {
    // Keep only the final path component.
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && !ILLEGAL_CHARS.contains(c) && *c != '*')
        .collect();
    let cleaned = cleaned.trim().to_string();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(AppError::validation(format!(
            "Invalid filename: '{raw}'"
        )));
    }

    Ok(cleaned)
}

/// Extract the lowercase extension of a filename, without the dot.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_passes() {
        assert_eq!(sanitize_filename("report.pdf").unwrap(), "report.pdf");
    }

    #[test]
    fn test_strips_unix_directories() {
        assert_eq!(
            sanitize_filename("../../etc/passwd.txt").unwrap(),
            "passwd.txt"
        );
    }

    #[test]
    fn test_strips_windows_directories() {
        assert_eq!(
            sanitize_filename("C:\\Users\\victim\\doc.pdf").unwrap(),
            "doc.pdf"
        );
    }

    #[test]
    fn test_strips_illegal_characters() {
        assert_eq!(sanitize_filename("we<ird>:na*me?.txt").unwrap(), "weirdname.txt");
    }

    #[test]
    fn test_rejects_empty_and_dots() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename(".").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("dir/").is_err());
        assert!(sanitize_filename("???").is_err());
    }

    #[test]
    fn test_extension_extraction() {
        assert_eq!(extension_of("report.PDF"), Some("pdf".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("trailing."), None);
    }
}
