// ottmarks platform paths
// Config and data directories per OS, with environment overrides for the data dir.
//
// Linux:   $XDG_CONFIG_HOME/ottmarks, $XDG_DATA_HOME/ottmarks (fallback ~/.config, ~/.local/share)
// macOS:   ~/Library/Application Support/ottmarks for both
// Windows: %APPDATA%/ottmarks for both

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "ottmarks";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "OTTMARKS_DATA_DIR";

fn home_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    let home = env::var("USERPROFILE").unwrap_or_else(|_| String::from("C:\\Users\\Default"));
    #[cfg(not(target_os = "windows"))]
    let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
    PathBuf::from(home)
}

/// Resolves `$<xdg_var>` or falls back to `~/<fallback>`, then appends the app dir.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn xdg_dir(xdg_var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(xdg_var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join(APP_DIR),
        _ => fallback
            .iter()
            .fold(home_dir(), |path, part| path.join(part))
            .join(APP_DIR),
    }
}

/// Returns the directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join(APP_DIR)
    }
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
            .join(APP_DIR)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        xdg_dir("XDG_CONFIG_HOME", &[".config"])
    }
}

/// Returns the directory holding the SQLite database.
///
/// `$OTTMARKS_DATA_DIR` wins over the platform default.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    {
        get_config_dir()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        xdg_dir("XDG_DATA_HOME", &[".local", "share"])
    }
}
