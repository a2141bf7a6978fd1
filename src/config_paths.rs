//! Where mention-editor keeps its files
//!
//! `MENTION_EDITOR_CONFIG_DIR` overrides everything. Otherwise the base is
//! `$XDG_CONFIG_HOME/mention-editor` or `~/.config/mention-editor` on
//! Unix/macOS, and the platform config dir (`%APPDATA%\mention-editor`) on
//! Windows. Inside it:
//!
//! - `config.yaml` - `MentionConfig`
//! - `fixtures.json` - offline search/lookup records
//! - `logs/mentions.log.YYYY-MM-DD` - daily rotated debug log

use std::env;
use std::io;
use std::path::PathBuf;

/// Environment variable naming an explicit config directory
pub const CONFIG_DIR_ENV: &str = "MENTION_EDITOR_CONFIG_DIR";

/// File name prefix of the rolling log
pub const LOG_FILE_PREFIX: &str = "mentions.log";

const APP_DIR: &str = "mention-editor";

pub fn config_dir() -> Option<PathBuf> {
    resolve_config_dir(env::var_os(CONFIG_DIR_ENV).map(PathBuf::from), platform_base())
}

fn resolve_config_dir(explicit: Option<PathBuf>, base: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .filter(|dir| !dir.as_os_str().is_empty())
        .or_else(|| base.map(|base| base.join(APP_DIR)))
}

#[cfg(target_os = "windows")]
fn platform_base() -> Option<PathBuf> {
    dirs::config_dir()
}

#[cfg(not(target_os = "windows"))]
fn platform_base() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .filter(|xdg| !xdg.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// Records used when no `--fixtures` file is given and HTTP is unavailable
pub fn fixtures_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("fixtures.json"))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Create the logs dir if needed and return it
pub fn ensure_logs_dir() -> io::Result<PathBuf> {
    let logs = logs_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory available"))?;
    std::fs::create_dir_all(&logs)?;
    Ok(logs)
}
