use clap::ArgMatches;
use colored::Colorize;
use glide_core::session::{Session, SessionOptions};
use glide_core::generate_session_report;
use glide_nav::classify::{is_dashboard_url, resolve_href};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Parse a target URL, trying to add http:// for scheme-less hosts
pub fn parse_target_url(line: &str) -> Option<Url> {
    if let Ok(url) = Url::parse(line)
        && matches!(url.scheme(), "http" | "https")
    {
        return Some(url);
    }

    // "example.com" and "localhost:8000" both land here
    let with_scheme = format!("http://{}", line);
    if let Ok(url) = Url::parse(&with_scheme) {
        return Some(url);
    }

    None
}

/// Load and parse hrefs from a newline-delimited file
pub fn load_hrefs_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hrefs file {}: {}", path.display(), e))?;

    let hrefs: Vec<String> = content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect();

    if hrefs.is_empty() {
        return Err(format!("No hrefs found in {}", path.display()));
    }

    Ok(hrefs)
}

fn require_target_url(raw: &str) -> Url {
    match parse_target_url(raw) {
        Some(url) => url,
        None => {
            eprintln!("{} '{}' is not a usable URL", "✗".red().bold(), raw);
            std::process::exit(1);
        }
    }
}

pub async fn handle_visit(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let raw_url = sub_matches.get_one::<String>("url").unwrap();
    let links: Vec<String> = sub_matches
        .get_many::<String>("link")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let hrefs_file = sub_matches.get_one::<PathBuf>("hrefs-file");
    let section = sub_matches.get_one::<String>("section");
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let as_json = sub_matches.get_flag("json");

    let start_url = require_target_url(raw_url);

    let links = if let Some(path) = hrefs_file {
        match load_hrefs_from_file(path) {
            Ok(hrefs) => hrefs,
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        }
    } else {
        links
    };

    // Spinner carrying session progress lines
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Connecting to {}", start_url));

    let spinner_clone = spinner.clone();
    let event_callback = Arc::new(move |msg: String| {
        spinner_clone.set_message(msg);
    });

    let options = SessionOptions::new(start_url.as_str())
        .with_timeout(timeout)
        .with_event_callback(event_callback);

    let mut session = match Session::start(options).await {
        Ok(session) => session,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} Session failed to start: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    for href in &links {
        if let Err(e) = session.navigate(href).await {
            spinner.suspend(|| {
                eprintln!("{} Navigation to {} failed: {}", "⚠".yellow().bold(), href, e);
            });
        }
    }

    if let Some(name) = section
        && let Err(e) = session.load_section(Some(name)).await
    {
        spinner.suspend(|| {
            eprintln!("{} Section load '{}' failed: {}", "⚠".yellow().bold(), name, e);
        });
    }

    spinner.finish_and_clear();
    println!("{} Session complete\n", "✓".green().bold());

    if as_json {
        match serde_json::to_string_pretty(session.outcomes()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} Failed to serialize outcomes: {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", generate_session_report(session.outcomes()));
    }
}

pub fn handle_check(sub_matches: &ArgMatches) {
    let raw_url = sub_matches.get_one::<String>("url").unwrap();
    let link = sub_matches.get_one::<String>("link").unwrap();

    let base = require_target_url(raw_url);

    match resolve_href(&base, link) {
        Some(resolved) if is_dashboard_url(&resolved) => {
            println!(
                "{} {} resolves to {} {}",
                "✓".green().bold(),
                link,
                resolved.to_string().bright_white(),
                "(dashboard - intercepted)".cyan()
            );
        }
        Some(resolved) => {
            println!(
                "{} {} resolves to {} (not intercepted)",
                "→".blue(),
                link,
                resolved.to_string().bright_white()
            );
        }
        None => {
            println!(
                "{} {} does not resolve to a navigable URL",
                "✗".red().bold(),
                link
            );
        }
    }
}

pub async fn handle_ui(sub_matches: &ArgMatches) {
    let raw_url = sub_matches.get_one::<String>("url").unwrap();
    let start_url = require_target_url(raw_url);

    // The TUI event loop blocks, so it runs on a blocking thread and
    // drives session futures through the runtime handle.
    let handle = tokio::runtime::Handle::current();
    let result = tokio::task::spawn_blocking(move || glide_tui::run(handle, start_url)).await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("{} Error running browser: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{} Browser task failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
