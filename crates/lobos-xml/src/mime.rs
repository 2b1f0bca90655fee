//! The fixed extension → MIME type table (`spec.md` §4.10). Deliberately a
//! hand-rolled `match`, not a crate dependency: the table is explicitly out
//! of scope for engineering effort and is small and closed-ended.

/// Return the MIME type for `path` based on its extension, matched
/// case-insensitively. Falls back to `application/text` for unknown or
/// missing extensions.
#[must_use]
pub fn mime_type(path: &str) -> &'static str {
    let ext = match path.rfind('.') {
        Some(pos) => &path[pos..],
        None => return "application/text",
    };

    match ext.to_ascii_lowercase().as_str() {
        ".htm" | ".html" | ".php" => "text/html",
        ".css" => "text/css",
        ".txt" => "text/plain",
        ".js" => "application/javascript",
        ".json" => "application/json",
        ".xml" => "application/xml",
        ".swf" => "application/x-shockwave-flash",
        ".flv" => "video/x-flv",
        ".png" => "image/png",
        ".jpe" | ".jpeg" | ".jpg" => "image/jpeg",
        ".gif" => "image/gif",
        ".bmp" => "image/bmp",
        ".ico" => "image/vnd.microsoft.icon",
        ".tif" | ".tiff" => "image/tiff",
        ".svg" | ".svgz" => "image/svg+xml",
        _ => "application/text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_expected_types() {
        assert_eq!(mime_type("a.html"), "text/html");
        assert_eq!(mime_type("a.JPG"), "image/jpeg");
        assert_eq!(mime_type("dir/a.json"), "application/json");
        assert_eq!(mime_type("a.svgz"), "image/svg+xml");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back() {
        assert_eq!(mime_type("a.unknown"), "application/text");
        assert_eq!(mime_type("noext"), "application/text");
    }
}
