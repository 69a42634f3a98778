//! Magic-byte content signatures for upload verification.
//!
//! An uploaded buffer must match one of the known signatures for its
//! claimed extension. Extensions without a reliable signature (plain-text
//! formats) have no rule and skip the check.

/// A signature: expected bytes at a fixed offset within the file.
struct Signature {
    offset: usize,
    bytes: &'static [u8],
}

const fn sig(offset: usize, bytes: &'static [u8]) -> Signature {
    Signature { offset, bytes }
}

/// Signature rules per extension. Office OOXML/OpenDocument formats are
/// zip containers; legacy Office formats share the OLE2 header.
fn rules_for(extension: &str) -> Option<&'static [Signature]> {
    static PDF: [Signature; 1] = [sig(0, b"%PDF")];
    static PNG: [Signature; 1] = [sig(0, &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])];
    static JPEG: [Signature; 1] = [sig(0, &[0xFF, 0xD8, 0xFF])];
    static GIF: [Signature; 2] = [sig(0, b"GIF87a"), sig(0, b"GIF89a")];
    static BMP: [Signature; 1] = [sig(0, b"BM")];
    // RIFF container with the WEBP fourcc at a non-zero offset.
    static WEBP: [Signature; 2] = [sig(0, b"RIFF"), sig(8, b"WEBP")];
    static ICO: [Signature; 1] = [sig(0, &[0x00, 0x00, 0x01, 0x00])];
    static ZIP: [Signature; 3] = [
        sig(0, &[0x50, 0x4B, 0x03, 0x04]),
        sig(0, &[0x50, 0x4B, 0x05, 0x06]),
        sig(0, &[0x50, 0x4B, 0x07, 0x08]),
    ];
    static GZIP: [Signature; 1] = [sig(0, &[0x1F, 0x8B])];
    static SEVEN_Z: [Signature; 1] = [sig(0, &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C])];
    static RAR: [Signature; 1] = [sig(0, &[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07])];
    // POSIX tar puts its magic at offset 257.
    static TAR: [Signature; 1] = [sig(257, b"ustar")];
    static OLE2: [Signature; 1] = [sig(0, &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])];

    match extension {
        "pdf" => Some(&PDF),
        "png" => Some(&PNG),
        "jpg" | "jpeg" => Some(&JPEG),
        "gif" => Some(&GIF),
        "bmp" => Some(&BMP),
        "webp" => Some(&WEBP),
        "ico" => Some(&ICO),
        "zip" | "docx" | "xlsx" | "pptx" | "odt" | "ods" | "odp" => Some(&ZIP),
        "gz" => Some(&GZIP),
        "7z" => Some(&SEVEN_Z),
        "rar" => Some(&RAR),
        "tar" => Some(&TAR),
        "doc" | "xls" | "ppt" => Some(&OLE2),
        _ => None,
    }
}

fn matches(data: &[u8], signature: &Signature) -> bool {
    data.len() >= signature.offset + signature.bytes.len()
        && &data[signature.offset..signature.offset + signature.bytes.len()] == signature.bytes
}

/// Check the buffer's leading bytes against the signatures known for the
/// extension.
///
/// Returns `None` when the extension has no known signature (plain-text
/// formats), otherwise whether any accepted signature matched. For `webp`
/// both the RIFF header and the WEBP fourcc at offset 8 must be present.
pub fn signature_matches(extension: &str, data: &[u8]) -> Option<bool> {
    let rules = rules_for(extension)?;
    let ok = match extension {
        // All parts of the container header must line up.
        "webp" => rules.iter().all(|s| matches(data, s)),
        _ => rules.iter().any(|s| matches(data, s)),
    };
    Some(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_signature() {
        assert_eq!(signature_matches("pdf", b"%PDF-1.7 rest"), Some(true));
        assert_eq!(signature_matches("pdf", b"PK\x03\x04"), Some(false));
    }

    #[test]
    fn test_png_signature() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(signature_matches("png", &png), Some(true));
        assert_eq!(signature_matches("png", b"%PDF"), Some(false));
    }

    #[test]
    fn test_webp_needs_both_parts() {
        let mut webp = Vec::new();
        webp.extend_from_slice(b"RIFF");
        webp.extend_from_slice(&[0x10, 0x00, 0x00, 0x00]);
        webp.extend_from_slice(b"WEBP");
        assert_eq!(signature_matches("webp", &webp), Some(true));

        // A RIFF header alone (e.g. a WAV file) must not pass.
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&[0x10, 0x00, 0x00, 0x00]);
        wav.extend_from_slice(b"WAVE");
        assert_eq!(signature_matches("webp", &wav), Some(false));
    }

    #[test]
    fn test_tar_magic_at_offset() {
        let mut tar = vec![0u8; 512];
        tar[257..262].copy_from_slice(b"ustar");
        assert_eq!(signature_matches("tar", &tar), Some(true));

        // Too short to even hold the magic.
        assert_eq!(signature_matches("tar", b"ustar"), Some(false));
    }

    #[test]
    fn test_office_formats_are_zip_containers() {
        assert_eq!(signature_matches("docx", b"PK\x03\x04rest"), Some(true));
        assert_eq!(signature_matches("xlsx", b"not a zip"), Some(false));
    }

    #[test]
    fn test_text_formats_have_no_rule() {
        assert_eq!(signature_matches("txt", b"anything at all"), None);
        assert_eq!(signature_matches("json", b"{}"), None);
        assert_eq!(signature_matches("md", b"# heading"), None);
        assert_eq!(signature_matches("svg", b"<svg/>"), None);
    }

    #[test]
    fn test_short_buffer_mismatches() {
        assert_eq!(signature_matches("png", &[0x89]), Some(false));
        assert_eq!(signature_matches("pdf", b""), Some(false));
    }
}
