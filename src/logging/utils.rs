//! Log file location, ANSI stripping and timestamps.
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range).
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            for inner in chars.by_ref() {
                if ('@'..='~').contains(&inner) {
                    break;
                }
            }
        }
    }
    out
}

/// `<xdg_cache_home>/devsetup`, else `<home>/.cache/devsetup`, else
/// `./.cache/devsetup`.
fn cache_dir_from(xdg_cache_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let base = xdg_cache_home
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            home.filter(|v| !v.is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        });
    base.join("devsetup")
}

/// Log file for `command`, creating its directory. `None` when the cache
/// directory cannot be created.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = cache_dir_from(
        std::env::var_os("XDG_CACHE_HOME"),
        std::env::var_os("HOME"),
    );
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Local time as `YYYY-MM-DD HH:MM:SS`, for the run header.
pub(super) fn format_datetime() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Local time as `HH:MM:SS`, for each log line.
pub(super) fn format_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
