use std::env;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "retro-popup";
const THEME_FILE: &str = "theme.txt";

// Platform data home, before the app folder is appended.
fn data_home() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return env::var_os("LOCALAPPDATA")
            .or_else(|| env::var_os("APPDATA"))
            .map(PathBuf::from);
    }
    if cfg!(target_os = "macos") {
        return env::var_os("HOME")
            .map(|home| PathBuf::from(home).join("Library/Application Support"));
    }
    env::var_os("XDG_DATA_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share")))
}

/// Where the persisted light/dark preference lives.
pub fn theme_path() -> PathBuf {
    data_home()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(THEME_FILE)
}
