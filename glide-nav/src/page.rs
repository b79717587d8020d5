use crate::classify::{resolve_href, same_view};
use scraper::{Html, Selector};
use url::Url;

/// Element id of the swappable content region.
pub const CONTENT_REGION_ID: &str = "main-content-area";

/// Selector for the sidebar navigation anchors.
pub const SIDEBAR_LINK_SELECTOR: &str = "nav.sidebar a.nav-link";

/// One sidebar navigation anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub label: String,
    pub active: bool,
}

/// Explicit document handle: the current location, the content region
/// markup, and the sidebar link set. Built once from a full document;
/// soft navigations mutate it in place instead of re-querying anything
/// ambient.
#[derive(Debug, Clone)]
pub struct Page {
    location: Url,
    content: Option<String>,
    sidebar: Vec<NavLink>,
}

impl Page {
    /// Parse a full HTML document fetched from `location`.
    ///
    /// A document without the content region still produces a page; the
    /// loader consults `has_content_region` and falls back to full loads
    /// for as long as the region is missing.
    pub fn parse(location: Url, html: &str) -> Self {
        let document = Html::parse_document(html);

        let region_selector =
            Selector::parse(&format!("#{CONTENT_REGION_ID}")).expect("valid region selector");
        let content = document
            .select(&region_selector)
            .next()
            .map(|element| element.inner_html());

        let link_selector =
            Selector::parse(SIDEBAR_LINK_SELECTOR).expect("valid sidebar selector");
        let mut sidebar = Vec::new();
        for element in document.select(&link_selector) {
            if let Some(href) = element.value().attr("href") {
                let label = element.text().collect::<String>().trim().to_string();
                let active = element.value().classes().any(|class| class == "active");
                sidebar.push(NavLink {
                    href: href.to_string(),
                    label,
                    active,
                });
            }
        }

        Self {
            location,
            content,
            sidebar,
        }
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn set_location(&mut self, location: Url) {
        self.location = location;
    }

    pub fn has_content_region(&self) -> bool {
        self.content.is_some()
    }

    /// Current content region markup, exactly as last set.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Replace the content region markup verbatim. Fragments are opaque:
    /// no parsing, no sanitization.
    pub fn replace_content(&mut self, html: impl Into<String>) {
        self.content = Some(html.into());
    }

    pub fn sidebar(&self) -> &[NavLink] {
        &self.sidebar
    }

    /// Sync the sidebar active marker to a target URL: clear every link,
    /// then mark exactly the links addressing the same view (path and
    /// query). Links whose hrefs fail to resolve are skipped.
    pub fn set_active_link(&mut self, target: &Url) {
        let location = self.location.clone();
        for link in &mut self.sidebar {
            link.active = match resolve_href(&location, &link.href) {
                Some(resolved) => same_view(&resolved, target),
                None => false,
            };
        }
    }

    pub fn active_link(&self) -> Option<&NavLink> {
        self.sidebar.iter().find(|link| link.active)
    }

    /// Plain-text projection of the content region, for terminal display.
    pub fn content_text(&self) -> String {
        match &self.content {
            Some(html) => {
                let fragment = Html::parse_fragment(html);
                fragment.root_element().text().collect::<String>()
            }
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<html><body>
        <nav class="sidebar">
            <a class="nav-link" href="/dashboard">Overview</a>
            <a class="nav-link" href="/dashboard?section=billing">Billing</a>
            <a class="nav-link" href="/dashboard?section=reports">Reports</a>
            <a class="nav-link" href="http://[::broken">Broken</a>
            <a class="nav-link" href="/items">Items</a>
        </nav>
        <div id="main-content-area"><p>Welcome</p></div>
    </body></html>"#;

    fn page() -> Page {
        Page::parse(Url::parse("http://app.test/").unwrap(), DOCUMENT)
    }

    #[test]
    fn test_parse_extracts_content_region_and_sidebar() {
        let page = page();
        assert!(page.has_content_region());
        assert_eq!(page.content(), Some("<p>Welcome</p>"));
        assert_eq!(page.sidebar().len(), 5);
        assert_eq!(page.sidebar()[1].label, "Billing");
        assert!(page.sidebar().iter().all(|link| !link.active));
    }

    #[test]
    fn test_parse_without_region() {
        let page = Page::parse(
            Url::parse("http://app.test/").unwrap(),
            "<html><body><p>bare</p></body></html>",
        );
        assert!(!page.has_content_region());
        assert_eq!(page.content(), None);
        assert_eq!(page.content_text(), "");
    }

    #[test]
    fn test_replace_content_is_verbatim() {
        let mut page = page();
        let fragment = "<section>\n  <h1>Billing</h1>\n</section>";
        page.replace_content(fragment);
        assert_eq!(page.content(), Some(fragment));
    }

    #[test]
    fn test_set_active_link_marks_exact_view_only() {
        let mut page = page();
        let target = Url::parse("http://app.test/dashboard?section=billing").unwrap();
        page.set_active_link(&target);

        let active: Vec<&str> = page
            .sidebar()
            .iter()
            .filter(|link| link.active)
            .map(|link| link.label.as_str())
            .collect();
        assert_eq!(active, vec!["Billing"]);
    }

    #[test]
    fn test_set_active_link_clears_previous_marker() {
        let mut page = page();
        page.set_active_link(&Url::parse("http://app.test/dashboard?section=billing").unwrap());
        page.set_active_link(&Url::parse("http://app.test/dashboard").unwrap());

        let active: Vec<&str> = page
            .sidebar()
            .iter()
            .filter(|link| link.active)
            .map(|link| link.label.as_str())
            .collect();
        assert_eq!(active, vec!["Overview"]);
    }

    #[test]
    fn test_set_active_link_skips_unresolvable_hrefs() {
        let mut page = page();
        // Would throw in the middle of the sidebar walk if the broken
        // href were not skipped.
        page.set_active_link(&Url::parse("http://app.test/items").unwrap());
        assert_eq!(page.active_link().map(|link| link.label.as_str()), Some("Items"));
    }

    #[test]
    fn test_active_marker_parsed_from_markup() {
        let html = r#"<nav class="sidebar">
            <a class="nav-link active" href="/dashboard">Overview</a>
        </nav><div id="main-content-area"></div>"#;
        let page = Page::parse(Url::parse("http://app.test/").unwrap(), html);
        assert!(page.sidebar()[0].active);
    }

    #[test]
    fn test_content_text_strips_markup() {
        let mut page = page();
        page.replace_content("<h1>Billing</h1><p>Total: 12</p>");
        assert_eq!(page.content_text(), "BillingTotal: 12");
    }
}
