use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::accordion::AccordionMode;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Page HTML file to boot.
    #[arg(long)]
    pub page: PathBuf,

    /// URL of the directory the page is served from (e.g. `https://site.example/docs/`).
    ///
    /// The shared navigation fragment is fetched relative to the page URL, and the page URL's
    /// origin scopes the stored theme preference.
    #[arg(long)]
    pub base_url: Url,

    /// Page path relative to `--base-url`. Defaults to the page file name.
    ///
    /// A path ending in `/` is treated as `index.html` when matching navigation links.
    #[arg(long)]
    pub route: Option<String>,

    /// Navigation fragment resource, resolved against the page URL.
    #[arg(long, default_value = "nav.html")]
    pub nav_resource: String,

    /// Storage key of the theme preference.
    #[arg(long, default_value = "as_theme")]
    pub theme_key: String,

    /// Accordion behaviour: `single` (one open item per container) or `multi`.
    #[arg(long, value_enum, default_value = "single")]
    pub accordion: AccordionMode,

    /// JSON file holding per-origin stored preferences.
    #[arg(long, default_value = ".page-bootstrap/storage.json")]
    pub storage: PathBuf,

    /// CSS selector of an element to click after boot. Repeatable; clicks run in order.
    #[arg(long = "click")]
    pub clicks: Vec<String>,

    /// Output HTML path. Defaults to `out/<page file name>`.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// HTTP User-Agent used for fetching the navigation fragment.
    #[arg(long, default_value = "page-bootstrap/0.1")]
    pub user_agent: String,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}
