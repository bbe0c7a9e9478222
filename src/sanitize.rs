use crate::Tags;

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Maps every character outside `[A-Za-z0-9_.-]` to `_`, one for one.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .collect()
}

/// Sanitizes both keys and values. Keys that collide after cleaning keep the
/// value of the last one in key order.
pub fn sanitize_tags(tags: &Tags) -> Tags {
    tags.iter()
        .map(|(k, v)| (sanitize(k), sanitize(v)))
        .collect()
}
