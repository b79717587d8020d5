use crate::error::Result;
use crate::history::History;
use crate::outcome::LoadOutcome;
use crate::page::Page;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// Post-swap reinitialization hook. Failures are best-effort by design:
/// the returned error is logged and dropped, never surfaced to the
/// navigation.
pub type ReinitHook = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Header marking a request as programmatic so the server renders a
/// bare fragment instead of a full page.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

pub struct FragmentLoader {
    client: Client,
    reinit_hook: Option<ReinitHook>,
    #[allow(dead_code)]
    timeout_secs: u64,
}

impl FragmentLoader {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Glide/0.1 (https://github.com/mvaleri/glide)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs / 2))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            reinit_hook: None,
            timeout_secs,
        }
    }

    pub fn with_reinit_hook(mut self, hook: ReinitHook) -> Self {
        self.reinit_hook = Some(hook);
        self
    }

    /// Load `href` into the page as a fragment.
    ///
    /// The request carries the programmatic-request header. A non-success
    /// status, a transport failure, or a page without a content region all
    /// abandon the fragment path and degrade to a full load of the same
    /// URL - no retry. On success the region is replaced with the body
    /// verbatim, the sidebar marker is synced, a soft history entry is
    /// pushed when `push` is set, and the reinit hook (if any) runs.
    pub async fn load(
        &self,
        page: &mut Page,
        history: &mut History,
        href: &Url,
        push: bool,
    ) -> Result<LoadOutcome> {
        debug!("Fetching fragment {}", href);
        let start = Instant::now();

        let response = match self
            .client
            .get(href.clone())
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Fragment request for {} failed, falling back to full load: {}", href, e);
                return self
                    .fall_back(page, history, href, push, format!("transport error: {e}"), start)
                    .await;
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!("Fragment response for {} was {}, falling back", href, status);
            return self
                .fall_back(page, history, href, push, format!("status {}", status.as_u16()), start)
                .await;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Reading fragment body for {} failed, falling back to full load: {}", href, e);
                return self
                    .fall_back(page, history, href, push, format!("body read error: {e}"), start)
                    .await;
            }
        };

        if !page.has_content_region() {
            debug!("Current page has no content region, falling back for {}", href);
            return self
                .fall_back(page, history, href, push, "missing content region", start)
                .await;
        }

        page.replace_content(body);
        page.set_location(href.clone());
        page.set_active_link(href);

        if push {
            history.push(true, href.as_str());
        }

        self.run_reinit_hook();

        let mut outcome = LoadOutcome::fragment(href.to_string(), status.as_u16());
        outcome.pushed_history = push;
        outcome.response_time = start.elapsed();
        Ok(outcome)
    }

    /// Full document load: no programmatic-request header, and the page is
    /// rebuilt from whatever body comes back - a server error page is
    /// still a page. Only transport failure is an error here.
    pub async fn full_load(&self, href: &Url) -> Result<(Page, u16)> {
        debug!("Full load of {}", href);
        let response = self.client.get(href.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((Page::parse(href.clone(), &body), status))
    }

    /// Hard fallback for an abandoned fragment load. The full navigation
    /// still lands in the history stack (as a non-soft entry) when the
    /// original request asked for recording; traversals never grow it.
    async fn fall_back(
        &self,
        page: &mut Page,
        history: &mut History,
        href: &Url,
        push: bool,
        reason: impl Into<String>,
        start: Instant,
    ) -> Result<LoadOutcome> {
        let (new_page, status) = self.full_load(href).await?;
        *page = new_page;

        if push {
            history.push(false, href.as_str());
        }

        let mut outcome =
            LoadOutcome::full_load(href.to_string(), status).with_fallback_reason(reason);
        outcome.pushed_history = push;
        outcome.response_time = start.elapsed();
        Ok(outcome)
    }

    fn run_reinit_hook(&self) {
        if let Some(ref hook) = self.reinit_hook
            && let Err(e) = hook()
        {
            debug!("Reinit hook failed (ignored): {e:#}");
        }
    }
}

impl Default for FragmentLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::NavMode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FULL_PAGE: &str = r#"<html><body>
        <nav class="sidebar">
            <a class="nav-link" href="/dashboard">Overview</a>
            <a class="nav-link" href="/dashboard?section=billing">Billing</a>
            <a class="nav-link" href="/items">Items</a>
        </nav>
        <div id="main-content-area"><p>Initial</p></div>
    </body></html>"#;

    const BARE_PAGE: &str = "<html><body><p>no region here</p></body></html>";

    fn seeded_page(server_uri: &str) -> (Page, History) {
        let location = Url::parse(server_uri).unwrap();
        let page = Page::parse(location, FULL_PAGE);
        let mut history = History::new();
        history.push(false, server_uri);
        (page, history)
    }

    async fn mount_fragment(server: &MockServer, at: &str, body: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(at))
            .and(header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("content-type", "text/html")
                    .set_body_string(body),
            )
            .mount(server)
            .await;
    }

    async fn mount_full_page(server: &MockServer, at: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(body),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fragment_swap_is_verbatim_and_pushes_once() {
        let server = MockServer::start().await;
        let fragment = "<h1>Dashboard</h1>\n<p>3 orders</p>";
        mount_fragment(&server, "/dashboard", fragment, 200).await;

        let (mut page, mut history) = seeded_page(&server.uri());
        let target = Url::parse(&format!("{}/dashboard", server.uri())).unwrap();

        let loader = FragmentLoader::new();
        let outcome = loader
            .load(&mut page, &mut history, &target, true)
            .await
            .unwrap();

        assert_eq!(outcome.mode, NavMode::Fragment);
        assert_eq!(outcome.status_code, 200);
        assert!(outcome.pushed_history);
        assert_eq!(page.content(), Some(fragment));
        assert_eq!(page.location(), &target);
        assert_eq!(history.ajax_len(), 1);
        assert_eq!(history.current().unwrap().href, target.as_str());
        assert_eq!(page.active_link().map(|l| l.label.as_str()), Some("Overview"));
    }

    #[tokio::test]
    async fn test_no_push_when_recording_not_requested() {
        let server = MockServer::start().await;
        mount_fragment(&server, "/dashboard", "<p>again</p>", 200).await;

        let (mut page, mut history) = seeded_page(&server.uri());
        let target = Url::parse(&format!("{}/dashboard", server.uri())).unwrap();

        let outcome = FragmentLoader::new()
            .load(&mut page, &mut history, &target, false)
            .await
            .unwrap();

        assert!(!outcome.pushed_history);
        assert_eq!(history.ajax_len(), 0);
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_falls_back_to_full_load() {
        let server = MockServer::start().await;
        // Fragment requests get a 404; the bare full load then serves the
        // whole document. Mount order matters: the stricter mock first.
        mount_fragment(&server, "/dashboard", "gone", 404).await;
        mount_full_page(&server, "/dashboard", FULL_PAGE).await;

        let (mut page, mut history) = seeded_page(&server.uri());
        let target = Url::parse(&format!("{}/dashboard", server.uri())).unwrap();

        let outcome = FragmentLoader::new()
            .load(&mut page, &mut history, &target, true)
            .await
            .unwrap();

        assert_eq!(outcome.mode, NavMode::FullLoad);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.fallback_reason.as_deref(), Some("status 404"));
        assert_eq!(history.ajax_len(), 0);
        assert_eq!(page.content(), Some("<p>Initial</p>"));
    }

    #[tokio::test]
    async fn test_missing_content_region_behaves_like_non_success() {
        let server = MockServer::start().await;
        mount_fragment(&server, "/dashboard", "<p>fragment</p>", 200).await;
        mount_full_page(&server, "/dashboard", FULL_PAGE).await;

        // Current page was built from a document without the region.
        let location = Url::parse(&server.uri()).unwrap();
        let mut page = Page::parse(location, BARE_PAGE);
        let mut history = History::new();
        history.push(false, server.uri());

        let target = Url::parse(&format!("{}/dashboard", server.uri())).unwrap();
        let outcome = FragmentLoader::new()
            .load(&mut page, &mut history, &target, true)
            .await
            .unwrap();

        assert_eq!(outcome.mode, NavMode::FullLoad);
        assert_eq!(outcome.fallback_reason.as_deref(), Some("missing content region"));
        assert_eq!(history.ajax_len(), 0);
        // The full load repaired the page structure.
        assert!(page.has_content_region());
    }

    #[tokio::test]
    async fn test_reinit_hook_runs_after_swap() {
        let server = MockServer::start().await;
        mount_fragment(&server, "/dashboard", "<p>swap</p>", 200).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let loader = FragmentLoader::new().with_reinit_hook(Arc::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        let (mut page, mut history) = seeded_page(&server.uri());
        let target = Url::parse(&format!("{}/dashboard", server.uri())).unwrap();
        loader
            .load(&mut page, &mut history, &target, true)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reinit_hook_failure_is_swallowed() {
        let server = MockServer::start().await;
        mount_fragment(&server, "/dashboard", "<p>swap</p>", 200).await;

        let loader = FragmentLoader::new()
            .with_reinit_hook(Arc::new(|| anyhow::bail!("widget init exploded")));

        let (mut page, mut history) = seeded_page(&server.uri());
        let target = Url::parse(&format!("{}/dashboard", server.uri())).unwrap();
        let outcome = loader
            .load(&mut page, &mut history, &target, true)
            .await
            .unwrap();

        assert_eq!(outcome.mode, NavMode::Fragment);
        assert_eq!(page.content(), Some("<p>swap</p>"));
        assert_eq!(history.ajax_len(), 1);
    }

    #[tokio::test]
    async fn test_full_load_omits_programmatic_header() {
        let server = MockServer::start().await;
        // Only mount the bare mock; a request carrying the header would
        // still match it, so assert on the received request instead.
        mount_full_page(&server, "/items", FULL_PAGE).await;

        let target = Url::parse(&format!("{}/items", server.uri())).unwrap();
        let (page, status) = FragmentLoader::new().full_load(&target).await.unwrap();

        assert_eq!(status, 200);
        assert!(page.has_content_region());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("x-requested-with"));
    }
}
