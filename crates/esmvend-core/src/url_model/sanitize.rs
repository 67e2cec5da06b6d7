//! Filesystem-safe path segments.

use percent_encoding::percent_decode_str;

/// Sanitizes one URL path segment (or host) for use as a path component.
///
/// - Percent-escapes are decoded first (`%40scope` → `@scope`), so the file
///   lands where a static server looks after decoding the request path
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Replaces the reserved names `.` and `..` with `_`
///
/// Everything else (including `@` and `+`, common in CDN URLs) is kept
/// verbatim so the mirrored tree stays recognizable.
pub fn sanitize_segment(segment: &str) -> String {
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    if decoded == "." || decoded == ".." {
        return "_".to_string();
    }
    decoded
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}
