use std::fs;
use std::path::PathBuf;

use clap::ValueEnum;
use log::{debug, warn};

use crate::env;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// Popup background: white for light, black for dark.
    pub const fn background_rgb(self) -> [u8; 3] {
        match self {
            Theme::Light => [0xff, 0xff, 0xff],
            Theme::Dark => [0x00, 0x00, 0x00],
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Persists the light/dark preference between popup sessions.
#[derive(Clone, Debug)]
pub struct StorageManager {
    theme_path: PathBuf,
}

impl StorageManager {
    pub fn new() -> Self {
        Self {
            theme_path: env::theme_path(),
        }
    }

    pub fn read_theme(&self) -> Option<Theme> {
        let raw = fs::read_to_string(&self.theme_path).ok()?;
        let theme = Theme::parse(&raw);
        if theme.is_none() {
            warn!("storage: ignoring unknown theme value {:?}", raw.trim());
        }
        theme
    }

    /// Stored theme, or the default when nothing valid has been saved.
    pub fn load_theme(&self) -> Theme {
        let theme = self.read_theme().unwrap_or_default();
        debug!("storage: theme {}", theme.as_str());
        theme
    }

    /// Theme for this run: an explicit choice wins and is remembered,
    /// otherwise whatever was saved last.
    pub fn resolve_theme(&self, requested: Option<Theme>) -> Theme {
        match requested {
            Some(theme) => {
                if let Err(err) = self.write_theme(theme) {
                    warn!("storage: failed to persist theme: {}", err);
                }
                theme
            }
            None => self.load_theme(),
        }
    }

    pub fn write_theme(&self, theme: Theme) -> Result<(), String> {
        if let Some(parent) = self.theme_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("unable to create preferences dir: {e}"))?;
        }
        fs::write(&self.theme_path, theme.as_str())
            .map_err(|e| format!("unable to persist theme: {e}"))
    }
}
