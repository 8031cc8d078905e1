use log::{debug, info, warn};

const STORE_DETAIL_BASE: &str = "https://chrome.google.com/webstore/detail";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenOptions {
    pub fullscreen: bool,
}

impl OpenOptions {
    pub const NEW_CONTEXT: Self = Self { fullscreen: false };
    pub const FULLSCREEN: Self = Self { fullscreen: true };
}

/// What the popup needs from whatever is hosting it.
pub trait HostEnvironment {
    /// Identifier the store knows this popup by, if the host has one.
    fn extension_id(&self) -> Option<String>;

    /// Open `url` in a new browsing context.
    fn open_external(&self, url: &str, options: OpenOptions) -> Result<(), String>;
}

/// Store review page for the given extension identifier.
#[must_use]
pub fn review_url(extension_id: &str) -> String {
    format!("{STORE_DETAIL_BASE}/{extension_id}/reviews")
}

/// Host backed by the desktop: URLs go to the system browser.
#[derive(Clone, Debug, Default)]
pub struct DesktopHost {
    extension_id: Option<String>,
}

impl DesktopHost {
    pub fn new(extension_id: Option<String>) -> Self {
        let extension_id = extension_id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty());
        if extension_id.is_none() {
            info!("host: no extension id configured; rating link disabled");
        }
        Self { extension_id }
    }
}

impl HostEnvironment for DesktopHost {
    fn extension_id(&self) -> Option<String> {
        self.extension_id.clone()
    }

    fn open_external(&self, url: &str, options: OpenOptions) -> Result<(), String> {
        if options.fullscreen {
            // The system browser decides its own window mode.
            debug!("host: fullscreen requested for {url}");
        }
        open::that_detached(url).map_err(|err| {
            warn!("host: failed to open {url}: {err}");
            format!("failed to open {url}: {err}")
        })
    }
}
