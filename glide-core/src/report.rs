// Session report generation from recorded navigation outcomes

use crate::session::extract_url_path;
use chrono::Utc;
use glide_nav::{LoadOutcome, NavMode};
use std::collections::HashMap;
use url::Url;

/// Render a plain-text report over the outcomes a session recorded.
pub fn generate_session_report(outcomes: &[LoadOutcome]) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str(&format!(
        "# Session summary ({})\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));

    let fragments = outcomes
        .iter()
        .filter(|o| o.mode == NavMode::Fragment)
        .count();
    let full_loads = outcomes
        .iter()
        .filter(|o| o.mode == NavMode::FullLoad)
        .count();
    let fallbacks = outcomes.iter().filter(|o| o.is_fallback()).count();

    report.push_str(&format!("  Navigations: {}\n", outcomes.len()));
    report.push_str(&format!("  Fragment loads: {}\n", fragments));
    report.push_str(&format!("  Full loads: {}\n", full_loads));
    report.push_str(&format!("  Hard fallbacks: {}\n", fallbacks));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Group outcomes by host
    let mut by_host: HashMap<String, Vec<&LoadOutcome>> = HashMap::new();
    for outcome in outcomes {
        if let Ok(url) = Url::parse(&outcome.url)
            && let Some(host) = url.host_str()
        {
            by_host.entry(host.to_string()).or_default().push(outcome);
        }
    }

    for (host, host_outcomes) in by_host.iter() {
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} navigations\n\n", host_outcomes.len()));

        for outcome in host_outcomes {
            let path = extract_url_path(&outcome.url);

            // Color code based on status
            let status_str = match outcome.status_code {
                100..=199 => format!("\x1b[37m{}\x1b[0m", outcome.status_code), // White
                200..=299 => format!("\x1b[32m{}\x1b[0m", outcome.status_code), // Green
                300..=399 => format!("\x1b[36m{}\x1b[0m", outcome.status_code), // Cyan
                400..=499 => format!("\x1b[33m{}\x1b[0m", outcome.status_code), // Orange/Yellow
                500..=599 => format!("\x1b[31m{}\x1b[0m", outcome.status_code), // Red
                _ => format!("{}", outcome.status_code),
            };

            let mode_str = match outcome.mode {
                NavMode::Fragment => "fragment",
                NavMode::FullLoad => "full",
            };

            let mut line = format!("  {} {} \x1b[90m{}\x1b[0m", status_str, path, mode_str);

            if let Some(ref reason) = outcome.fallback_reason {
                line.push_str(&format!(" \x1b[90m(fallback: {})\x1b[0m", reason));
            }

            report.push_str(&line);
            report.push('\n');
        }
        report.push('\n');
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_modes_and_fallbacks() {
        let outcomes = vec![
            LoadOutcome::full_load("http://app.test/".to_string(), 200),
            LoadOutcome::fragment("http://app.test/dashboard".to_string(), 200),
            LoadOutcome::full_load("http://app.test/dashboard".to_string(), 404)
                .with_fallback_reason("status 404"),
        ];

        let report = generate_session_report(&outcomes);
        assert!(report.contains("Navigations: 3"));
        assert!(report.contains("Fragment loads: 1"));
        assert!(report.contains("Full loads: 2"));
        assert!(report.contains("Hard fallbacks: 1"));
        assert!(report.contains("app.test"));
        assert!(report.contains("fallback: status 404"));
    }

    #[test]
    fn test_report_skips_unparseable_urls_in_grouping() {
        let outcomes = vec![LoadOutcome::fragment("not a url".to_string(), 200)];
        let report = generate_session_report(&outcomes);
        assert!(report.contains("Navigations: 1"));
        assert!(!report.contains("## "));
    }
}
