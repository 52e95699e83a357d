pub mod accordion;
pub mod bootstrap;
mod cli;
pub mod dom;
pub mod effect;
pub mod fetcher;
pub mod highlight;
pub mod nav;
pub mod page;
pub mod progress;
pub mod registry;
pub mod storage;
pub mod theme;
pub mod year;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cli::Args;
use fetcher::Fetcher;
use page::{BootConfig, Page};
use storage::FileStorage;
use url::Url;

pub use accordion::AccordionMode;
pub use bootstrap::{BootReport, boot};
pub use cli::{Args as CliArgs, ProgressMode};
pub use nav::NavOutcome;
pub use theme::Theme;

pub async fn run(args: Args) -> anyhow::Result<BootReport> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);
    progress.set_stage("read page");

    let html = std::fs::read_to_string(&args.page)
        .with_context(|| format!("read {}", args.page.display()))?;
    let file_name = page_file_name(&args.page)?;
    let page_url = resolve_page_url(&args.base_url, args.route.as_deref().unwrap_or(&file_name))?;

    let origin = page_url.origin().ascii_serialization();
    let storage = FileStorage::open(&args.storage, &origin);
    tracing::debug!(storage = %storage.path().display(), %origin, "opened preference storage");

    let config = BootConfig {
        page_url,
        nav_resource: args.nav_resource.clone(),
        theme_key: args.theme_key.clone(),
        accordion_mode: args.accordion,
    };
    let mut page = Page::parse(&html, config, Box::new(storage));
    let fetcher = Fetcher::new(&args.user_agent)?;

    let report = boot(&mut page, &fetcher, &progress).await;

    if !args.clicks.is_empty() {
        progress.set_stage("replay clicks");
    }
    for selector in &args.clicks {
        if !page.click_selector(selector)? {
            tracing::warn!(%selector, "click target not found");
        }
    }

    progress.set_stage("write output");
    let out_path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from("out").join(&file_name));
    write_output(&out_path, &page.to_html()?)?;

    tracing::info!(
        out = %out_path.display(),
        theme = %page.theme_attr().unwrap_or_default(),
        nav = ?report.nav,
        accordion_buttons = report.accordion_buttons,
        year_slots = report.year_slots,
        clicks = args.clicks.len(),
        "page booted"
    );
    progress.finish(&report);
    Ok(report)
}

fn page_file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

fn resolve_page_url(base_url: &Url, route: &str) -> anyhow::Result<Url> {
    base_url
        .join(route.trim_start_matches('/'))
        .with_context(|| format!("resolve {route} against {base_url}"))
}

fn write_output(path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    std::fs::write(path, html).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_is_relative_to_base_directory() {
        let base = Url::parse("https://site.example/docs/").unwrap();
        assert_eq!(
            resolve_page_url(&base, "about.html").unwrap().as_str(),
            "https://site.example/docs/about.html"
        );
        assert_eq!(
            resolve_page_url(&base, "/guide/").unwrap().as_str(),
            "https://site.example/docs/guide/"
        );
    }
}
