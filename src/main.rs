use std::time::Duration;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

mod catalog;
mod env;
mod host;
mod popup;
mod storage;
mod ui;
mod util;

use crate::catalog::{CATALOG_URL, CatalogFetcher, DEFAULT_TIMEOUT_SECS};
use crate::storage::{StorageManager, Theme};
use crate::ui::PopupOptions;

#[derive(Parser, Debug)]
#[command(
    name = "Retro Popup",
    author,
    version,
    about = "Browse and search a remote catalog of retro games, with a featured game one click away"
)]
struct Cli {
    /// Print the version and exit without starting the UI.
    #[arg(long)]
    version_only: bool,

    /// Where the game catalog is downloaded from.
    #[arg(long, default_value = CATALOG_URL)]
    catalog_url: String,

    /// Store identifier used to build the review link. Rating is disabled without it.
    #[arg(long, env = "RETRO_POPUP_EXTENSION_ID")]
    extension_id: Option<String>,

    /// Give up on the catalog request after this many seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Use and remember this theme.
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Fetch the catalog once, print the menu contents, and exit.
    #[arg(long)]
    list: bool,

    /// Search term applied in --list mode.
    #[arg(long, requires = "list")]
    search: Option<String>,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.version_only {
        println!("Retro Popup {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let storage = StorageManager::new();
    let options = PopupOptions {
        catalog_url: cli.catalog_url,
        extension_id: cli.extension_id,
        timeout: Duration::from_secs(cli.timeout_secs),
        theme: storage.resolve_theme(cli.theme),
        storage,
    };

    if cli.list {
        run_listing(&options, cli.search.as_deref().unwrap_or_default());
        return Ok(());
    }

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Retro Popup")
            .with_inner_size(eframe::egui::vec2(820.0, 600.0)),
        ..Default::default()
    };
    eframe::run_native(
        "Retro Popup",
        native_options,
        Box::new(|cc| Ok(Box::new(ui::PopupApp::new(cc, options)))),
    )
}

fn run_listing(options: &PopupOptions, term: &str) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            error!("list: failed to create Tokio runtime: {err}");
            return;
        }
    };
    let fetcher = CatalogFetcher::new(options.catalog_url.clone(), options.timeout);
    info!("list: fetching catalog from {}", fetcher.url());
    let catalog = runtime.block_on(fetcher.load_catalog());
    print!("{}", ui::render_listing(&catalog, term));
}
