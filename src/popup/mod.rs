use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::filter::{self, CatalogView};
use crate::catalog::models::{FIXED_GAME, Game};
use crate::catalog::{CatalogSource, catalog_or_empty};
use crate::host::{HostEnvironment, OpenOptions, review_url};
use crate::util::cancel_requested;

pub mod state;

use self::state::{CatalogUpdate, FetchStatus};

/// Page opened by the fullscreen shortcut.
pub const FULLSCREEN_URL: &str = "https://retrobowl.me";

pub struct PopupController {
    runtime: Handle,
    source: Arc<dyn CatalogSource>,
    host: Box<dyn HostEnvironment>,
    catalog: Vec<Game>,
    search_term: String,
    menu_open: bool,
    fetch: FetchStatus,
    // Bumped on every mount and teardown; updates from older generations are dropped.
    generation: u64,
    cancel_flag: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    updates_tx: mpsc::UnboundedSender<CatalogUpdate>,
    updates_rx: mpsc::UnboundedReceiver<CatalogUpdate>,
}

impl PopupController {
    pub fn new(
        runtime: Handle,
        source: Arc<dyn CatalogSource>,
        host: Box<dyn HostEnvironment>,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            source,
            host,
            catalog: Vec::new(),
            search_term: String::new(),
            menu_open: false,
            fetch: FetchStatus::Idle,
            generation: 0,
            cancel_flag: Arc::new(AtomicBool::new(false)),
            task: None,
            updates_tx,
            updates_rx,
        }
    }

    /// Start loading the catalog in the background. A mount while a fetch is
    /// still outstanding is a no-op.
    pub fn on_mount(&mut self) {
        if self.fetch == FetchStatus::Loading {
            debug!("popup: mount ignored, fetch already in flight");
            return;
        }
        self.generation += 1;
        self.cancel_flag = Arc::new(AtomicBool::new(false));
        self.fetch = FetchStatus::Loading;
        info!("popup: mounted (generation {}), fetching catalog", self.generation);

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let cancel = Arc::clone(&self.cancel_flag);
        let tx = self.updates_tx.clone();
        self.task = Some(self.runtime.spawn(async move {
            let games = catalog_or_empty(source.fetch().await);
            if cancel_requested(&cancel) {
                debug!("popup: generation {generation} torn down, dropping catalog");
                return;
            }
            let _ = tx.send(CatalogUpdate { generation, games });
        }));
    }

    /// Apply any finished fetch. Called once per frame.
    pub fn sync(&mut self) {
        while let Ok(update) = self.updates_rx.try_recv() {
            if update.generation != self.generation || self.fetch != FetchStatus::Loading {
                debug!(
                    "popup: discarding stale catalog from generation {}",
                    update.generation
                );
                continue;
            }
            self.catalog = update.games;
            self.fetch = FetchStatus::Ready;
            self.task = None;
        }
    }

    /// Cancel the outstanding fetch. Whatever it produces later is discarded.
    pub fn teardown(&mut self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("popup: aborted catalog fetch");
        }
        if self.fetch == FetchStatus::Loading {
            self.fetch = FetchStatus::Idle;
        }
        self.generation += 1;
    }

    pub fn on_search_input(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn on_toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    pub fn catalog(&self) -> &[Game] {
        &self.catalog
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn fetch_status(&self) -> FetchStatus {
        self.fetch
    }

    pub fn is_loading(&self) -> bool {
        self.fetch == FetchStatus::Loading
    }

    pub fn view(&self) -> CatalogView<'_> {
        filter::catalog_view(&self.catalog, &self.search_term)
    }

    pub fn open_fullscreen(&self) -> Result<(), String> {
        info!("popup: opening {FULLSCREEN_URL} fullscreen");
        self.host.open_external(FULLSCREEN_URL, OpenOptions::FULLSCREEN)
    }

    /// Whether the host can identify us well enough to build a review link.
    pub fn can_rate(&self) -> bool {
        self.host.extension_id().is_some()
    }

    /// Open the store review page for this extension.
    ///
    /// # Errors
    /// Fails without navigating when the host has no extension identifier,
    /// or when the host cannot open the page.
    pub fn open_rating_link(&self) -> Result<(), String> {
        let Some(extension_id) = self.host.extension_id() else {
            warn!("popup: rating link requested but extension id is unavailable");
            return Err("extension id unavailable".into());
        };
        let url = review_url(&extension_id);
        info!("popup: opening review page {url}");
        self.host.open_external(&url, OpenOptions::NEW_CONTEXT)
    }

    /// Open the featured game outside the popup.
    pub fn open_featured(&self) -> Result<(), String> {
        info!("popup: opening featured game {}", FIXED_GAME.name);
        self.host.open_external(FIXED_GAME.link, OpenOptions::NEW_CONTEXT)
    }

    pub fn open_game(&self, game: &Game) -> Result<(), String> {
        info!("popup: opening game {} ({})", game.name, game.id);
        self.host.open_external(&game.link, OpenOptions::NEW_CONTEXT)
    }
}

impl Drop for PopupController {
    fn drop(&mut self) {
        self.teardown();
    }
}
