//! Log file location, timestamps and ANSI stripping for the file sink.
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `strftime` format of the run header written when a log file is opened.
pub(super) const HEADER_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// `strftime` format prefixed to every log line.
pub(super) const LINE_TIME: &str = "%H:%M:%S";

/// The current UTC time rendered with `format`.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}

#[derive(Clone, Copy)]
enum Scan {
    Text,
    Escape,
    Csi,
}

/// Remove terminal escape sequences from `s`.
///
/// A CSI sequence (`ESC [` up to a final byte in `@`..=`~`) is dropped whole;
/// any other escape drops `ESC` and the byte after it.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut scan = Scan::Text;
    for c in s.chars() {
        scan = match (scan, c) {
            (Scan::Text, '\x1b') => Scan::Escape,
            (Scan::Text, c) => {
                out.push(c);
                Scan::Text
            }
            (Scan::Escape, '[') => Scan::Csi,
            (Scan::Escape, _) | (Scan::Csi, '@'..='~') => Scan::Text,
            (Scan::Csi, _) => Scan::Csi,
        };
    }
    out
}

/// Log file of `command` given the values of `XDG_CACHE_HOME` and `HOME`.
///
/// An unset, empty or relative `XDG_CACHE_HOME` falls back to `~/.cache`.
fn log_file_in(xdg_cache_home: Option<OsString>, home: Option<OsString>, command: &str) -> PathBuf {
    let cache = match (xdg_cache_home, home) {
        (Some(xdg), _) if Path::new(&xdg).is_absolute() => PathBuf::from(xdg),
        (_, Some(home)) => PathBuf::from(home).join(".cache"),
        _ => PathBuf::from(".cache"),
    };
    cache.join("stagehand").join(format!("{command}.log"))
}

/// `$XDG_CACHE_HOME/stagehand/<command>.log`. Nothing is created here.
pub(super) fn log_file_path(command: &str) -> PathBuf {
    log_file_in(env::var_os("XDG_CACHE_HOME"), env::var_os("HOME"), command)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn os(s: &str) -> Option<OsString> {
        Some(OsString::from(s))
    }

    #[test]
    fn strip_ansi_drops_sgr_and_csi_sequences() {
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mPlacing staging tree\x1b[0m"),
            "==> Placing staging tree"
        );
        assert_eq!(strip_ansi("\x1b[2;5H\x1b[Kcreated /etc/motd"), "created /etc/motd");
    }

    #[test]
    fn strip_ansi_drops_two_byte_escapes() {
        assert_eq!(strip_ansi("\x1b7saved\x1b8"), "saved");
    }

    #[test]
    fn strip_ansi_keeps_plain_and_unicode_text() {
        assert_eq!(strip_ansi(""), "");
        assert_eq!(strip_ansi("✓ 2 created"), "✓ 2 created");
        assert_eq!(strip_ansi("\x1b[32m✓\x1b[0m 2 created"), "✓ 2 created");
    }

    #[test]
    fn log_file_prefers_absolute_xdg_cache_home() {
        assert_eq!(
            log_file_in(os("/var/cache/ops"), os("/home/ops"), "apply"),
            PathBuf::from("/var/cache/ops/stagehand/apply.log")
        );
    }

    #[test]
    fn log_file_falls_back_to_home_cache() {
        let expected = PathBuf::from("/home/ops/.cache/stagehand/render.log");
        assert_eq!(log_file_in(None, os("/home/ops"), "render"), expected);
        assert_eq!(log_file_in(os(""), os("/home/ops"), "render"), expected);
        assert_eq!(log_file_in(os("relative"), os("/home/ops"), "render"), expected);
    }

    #[test]
    fn log_file_without_any_home_is_relative() {
        assert_eq!(
            log_file_in(None, None, "apply"),
            PathBuf::from(".cache/stagehand/apply.log")
        );
    }

    #[test]
    fn timestamps_follow_their_formats() {
        let header = utc_now(HEADER_TIME);
        assert_eq!(header.len(), 19);
        assert_eq!(&header[4..5], "-");
        assert_eq!(&header[10..11], " ");
        let line = utc_now(LINE_TIME);
        assert_eq!(line.len(), 8);
        assert_eq!(&line[2..3], ":");
    }
}
