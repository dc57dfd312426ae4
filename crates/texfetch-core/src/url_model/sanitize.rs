//! Path component sanitization for cache directory names.

/// Sanitizes one component of a cache path (provider dir, asset id or
/// variant label) so it cannot escape or nest inside the cache tree.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Collapses consecutive underscores produced by replacement
/// - Trims leading/trailing spaces and dots
/// - Limits length to 255 bytes (Linux NAME_MAX)
/// - Returns `_` for an empty result
pub fn sanitize_path_component(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_replaced = false;

    for c in name.chars() {
        if c == '\0' || c == '/' || c == '\\' || c.is_control() {
            if !prev_replaced {
                out.push('_');
            }
            prev_replaced = true;
        } else {
            out.push(c);
            prev_replaced = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.');

    let bounded = if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        &trimmed[..take]
    } else {
        trimmed
    };

    if bounded.is_empty() {
        "_".to_string()
    } else {
        bounded.to_string()
    }
}
