use crate::fetcher::Fetcher;
use crate::nav::{NavOutcome, PendingNav};
use crate::page::Page;
use crate::progress::Progress;
use crate::theme::Theme;
use crate::year;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReport {
    pub theme: Theme,
    pub nav: NavOutcome,
    pub accordion_buttons: usize,
    pub year_slots: usize,
    pub theme_toggle_wired: bool,
    pub highlighted_links: Vec<usize>,
}

/// Runs the boot sequence once against `page`.
///
/// Only the navigation fetch suspends. It is started before the synchronous
/// steps and awaited after them; the injection and its follow-up wiring run
/// only when it succeeds. A failed fetch is logged and reported, never
/// returned as an error.
pub async fn boot(page: &mut Page, fetcher: &Fetcher, progress: &Progress) -> BootReport {
    progress.set_stage("apply saved theme");
    let theme = page.apply_saved_theme();

    let pending = if page.registry().placeholders.is_empty() {
        tracing::debug!("no navigation placeholders; skipping fetch");
        None
    } else {
        match page.config().nav_url() {
            Ok(url) => Some(PendingNav::start(fetcher, url)),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "cannot resolve navigation resource");
                None
            }
        }
    };

    progress.set_stage("wire accordions");
    let accordion_buttons = page.wire_accordions();

    progress.set_stage("stamp year");
    let year_slots = page.stamp_year(year::current_year());

    let mut report = BootReport {
        theme,
        nav: NavOutcome::Skipped,
        accordion_buttons,
        year_slots,
        theme_toggle_wired: false,
        highlighted_links: Vec::new(),
    };

    let Some(pending) = pending else {
        if !page.registry().placeholders.is_empty() {
            report.nav = NavOutcome::Failed {
                reason: "navigation resource url is invalid".to_string(),
            };
        }
        return report;
    };

    progress.set_stage("load navigation");
    let url = pending.url().clone();
    match pending.finish().await {
        Ok(html) => {
            let placeholders = page.inject_navigation(&html);
            tracing::info!(%url, placeholders, bytes = html.len(), "injected navigation");
            if let Some((toggle, links)) = page.navigation_ready() {
                report.theme_toggle_wired = toggle;
                report.highlighted_links = links;
            }
            report.nav = NavOutcome::Injected { placeholders };
        }
        Err(err) => {
            tracing::warn!(error = %err, "navigation not loaded; page left without it");
            report.nav = NavOutcome::Failed {
                reason: err.to_string(),
            };
        }
    }

    report
}
