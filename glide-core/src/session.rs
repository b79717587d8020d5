use glide_nav::classify::{is_dashboard_url, resolve_href};
use glide_nav::error::{NavError, Result};
use glide_nav::{FragmentLoader, History, LoadOutcome, Page, ReinitHook};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use url::Url;

/// Callback for human-readable session progress lines
pub type NavEventCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Options for starting a navigation session
pub struct SessionOptions {
    pub start_url: String,
    pub timeout_secs: u64,
    pub event_callback: Option<NavEventCallback>,
    pub reinit_hook: Option<ReinitHook>,
}

impl SessionOptions {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            timeout_secs: 10,
            event_callback: None,
            reinit_hook: None,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_event_callback(mut self, callback: NavEventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub fn with_reinit_hook(mut self, hook: ReinitHook) -> Self {
        self.reinit_hook = Some(hook);
        self
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() { "/".to_string() } else { path }
        })
        .unwrap_or_else(|| url.to_string())
}

/// One client lifetime over a start location: owns the loader, the page
/// handle, the history stack, and the recorded outcomes.
///
/// Every navigation method takes `&mut self`, so loads are strictly
/// sequential - a second fragment fetch cannot start while one is in
/// flight.
pub struct Session {
    loader: FragmentLoader,
    page: Page,
    history: History,
    outcomes: Vec<LoadOutcome>,
    event_callback: Option<NavEventCallback>,
}

impl Session {
    /// Start a session with an initial full load of the start URL.
    pub async fn start(options: SessionOptions) -> Result<Session> {
        let SessionOptions {
            start_url,
            timeout_secs,
            event_callback,
            reinit_hook,
        } = options;

        let start = Url::parse(&start_url)
            .map_err(|e| NavError::InvalidUrl(format!("{start_url}: {e}")))?;

        let mut loader = FragmentLoader::with_timeout(timeout_secs);
        if let Some(hook) = reinit_hook {
            loader = loader.with_reinit_hook(hook);
        }

        info!("Starting session at {}", start);
        let began = Instant::now();
        let (page, status) = loader.full_load(&start).await?;

        let mut history = History::new();
        history.push(false, start.as_str());

        let mut outcome = LoadOutcome::full_load(start.to_string(), status);
        outcome.pushed_history = true;
        outcome.response_time = began.elapsed();

        let session = Self {
            loader,
            page,
            history,
            outcomes: vec![outcome],
            event_callback,
        };
        session.emit(format!("Loaded {} ({})", start, status));
        Ok(session)
    }

    /// The click path: resolve the href against the current location; a
    /// dashboard target is soft-loaded with history recording, anything
    /// else gets an ordinary full load (the engine does not intercept
    /// non-dashboard navigation).
    pub async fn navigate(&mut self, href: &str) -> Result<LoadOutcome> {
        let location = self.page.location().clone();
        let Some(target) = resolve_href(&location, href) else {
            return Err(NavError::InvalidUrl(format!("unresolvable href: {href}")));
        };

        let outcome = if is_dashboard_url(&target) {
            self.emit(format!("Loading fragment {}", extract_url_path(target.as_str())));
            self.loader
                .load(&mut self.page, &mut self.history, &target, true)
                .await?
        } else {
            self.emit(format!("Full load {}", target));
            self.full_navigate(&target, true).await?
        };

        self.record(outcome)
    }

    /// Browser-style back traversal. `None` at the oldest entry.
    pub async fn back(&mut self) -> Result<Option<LoadOutcome>> {
        let Some(entry) = self.history.back() else {
            debug!("Back requested at the oldest history entry");
            return Ok(None);
        };
        let href = entry.href.clone();
        let outcome = self.traverse_to(&href).await?;
        Ok(Some(outcome))
    }

    /// Browser-style forward traversal. `None` at the newest entry.
    pub async fn forward(&mut self) -> Result<Option<LoadOutcome>> {
        let Some(entry) = self.history.forward() else {
            debug!("Forward requested at the newest history entry");
            return Ok(None);
        };
        let href = entry.href.clone();
        let outcome = self.traverse_to(&href).await?;
        Ok(Some(outcome))
    }

    /// Programmatic entry point: build `/dashboard` (optionally with a
    /// section query) on the current origin and soft-load it with history
    /// recording.
    pub async fn load_section(&mut self, section: Option<&str>) -> Result<LoadOutcome> {
        let mut target = self
            .page
            .location()
            .join("/dashboard")
            .map_err(|e| NavError::InvalidUrl(e.to_string()))?;
        if let Some(name) = section {
            target.query_pairs_mut().append_pair("section", name);
        }

        self.emit(format!(
            "Loading section {}",
            section.unwrap_or("(default)")
        ));
        let outcome = self
            .loader
            .load(&mut self.page, &mut self.history, &target, true)
            .await?;
        self.record(outcome)
    }

    /// Popstate handling: dashboard locations re-run the fragment loader
    /// without pushing; anything else is a full load, also without
    /// pushing - a traversal never grows the stack.
    async fn traverse_to(&mut self, href: &str) -> Result<LoadOutcome> {
        let target =
            Url::parse(href).map_err(|e| NavError::InvalidUrl(format!("{href}: {e}")))?;

        let outcome = if is_dashboard_url(&target) {
            self.emit(format!("Back/forward fragment {}", extract_url_path(href)));
            self.loader
                .load(&mut self.page, &mut self.history, &target, false)
                .await?
        } else {
            self.emit(format!("Back/forward full load {}", target));
            self.full_navigate(&target, false).await?
        };

        self.record(outcome)
    }

    async fn full_navigate(&mut self, target: &Url, push: bool) -> Result<LoadOutcome> {
        let began = Instant::now();
        let (page, status) = self.loader.full_load(target).await?;
        self.page = page;

        if push {
            self.history.push(false, target.as_str());
        }

        let mut outcome = LoadOutcome::full_load(target.to_string(), status);
        outcome.pushed_history = push;
        outcome.response_time = began.elapsed();
        Ok(outcome)
    }

    fn record(&mut self, outcome: LoadOutcome) -> Result<LoadOutcome> {
        self.outcomes.push(outcome.clone());
        Ok(outcome)
    }

    fn emit(&self, message: String) {
        if let Some(ref callback) = self.event_callback {
            callback(message);
        }
    }

    pub fn location(&self) -> &Url {
        self.page.location()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn outcomes(&self) -> &[LoadOutcome] {
        &self.outcomes
    }
}
