//! Variant playlist lookup
//!
//! Playlists pair an attribute line with the URI on the line right after it.
//! Lookup is plain substring containment, no HLS parsing.

/// Return the line following the first line containing `marker`.
///
/// `None` when no line contains the marker, or when the only match is the
/// last line of the manifest.
pub fn resolve<'a>(manifest: &'a str, marker: &str) -> Option<&'a str> {
    let mut lines = manifest.lines();
    while let Some(line) = lines.next() {
        if line.contains(marker) {
            return lines.next();
        }
    }
    None
}
