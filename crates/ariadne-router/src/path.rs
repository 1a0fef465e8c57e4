//! Path normalisation.

/// Normalises a request path.
///
/// Strips the query string and fragment, enforces exactly one leading
/// slash, and collapses a run of trailing slashes to one.
///
/// ```
/// use ariadne_router::normalize;
///
/// assert_eq!(normalize("pets?limit=10"), "/pets");
/// assert_eq!(normalize("//pets//"), "/pets/");
/// assert_eq!(normalize(""), "/");
/// ```
#[must_use]
pub fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_start_matches('/');

    let mut normalized = String::with_capacity(trimmed.len() + 1);
    normalized.push('/');
    normalized.push_str(trimmed);

    while normalized.ends_with("//") {
        normalized.pop();
    }
    normalized
}

/// Strips trailing slashes, keeping the root `/`.
#[must_use]
pub fn strip_trailing_slashes(path: &str) -> &str {
    let stripped = path.trim_end_matches('/');
    if stripped.is_empty() {
        "/"
    } else {
        stripped
    }
}

/// Returns `path` relative to `root`, or `None` when it lies outside.
///
/// Matching is segment-aware: `/api` contains `/api` and `/api/pets` but
/// not `/apiary`. `root` must already be normalised without a trailing
/// slash (except the bare `/`).
#[must_use]
pub fn strip_api_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    if root == "/" {
        return Some(path);
    }
    let rest = path.strip_prefix(root)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
