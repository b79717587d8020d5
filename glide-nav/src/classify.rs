use url::Url;

/// Resolve a raw href attribute against the current location.
///
/// Empty and fragment-only hrefs are same-page affordances, not
/// navigations, and resolve to `None`. Join failures also yield `None`
/// so a malformed href can never abort classification.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved)
}

/// True when the URL targets the dashboard view: the root path, or any
/// path ending in `/dashboard`.
pub fn is_dashboard_url(url: &Url) -> bool {
    let path = url.path();
    path == "/" || path.ends_with("/dashboard")
}

/// Classify a raw href against the current location. Hrefs that fail to
/// resolve classify as non-matching.
pub fn is_dashboard_href(base: &Url, href: &str) -> bool {
    resolve_href(base, href)
        .map(|url| is_dashboard_url(&url))
        .unwrap_or(false)
}

/// Two URLs address the same view when path and query string match
/// exactly. Origin is ignored.
pub fn same_view(a: &Url, b: &Url) -> bool {
    a.path() == b.path() && a.query() == b.query()
}
