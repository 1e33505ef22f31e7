//! Console and file logging for stagehand runs.
//!
//! Everything goes through [`tracing`]. [`init_subscriber`] installs two
//! sinks: the console, filtered by `--verbose` or [`LOG_ENV_VAR`], and a
//! per-command log file that always records `DEBUG` and above. Events on
//! [`STAGE_TARGET`] render as section headers and events on
//! [`DRY_RUN_TARGET`] as suppressed actions. Command handlers log through
//! the [`Logger`] facade; the placement engine emits events directly.

mod logger;
mod subscriber;
mod utils;

pub use logger::Logger;
pub use subscriber::{DRY_RUN_TARGET, LOG_ENV_VAR, STAGE_TARGET, init_subscriber};

#[cfg(test)]
static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Run `f` with `XDG_CACHE_HOME` set to `dir`, then unset it again.
#[cfg(test)]
#[allow(unsafe_code)]
pub(crate) fn with_cache_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let _lock = ENV_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    // SAFETY: every test that touches the environment holds ENV_LOCK.
    unsafe {
        std::env::set_var("XDG_CACHE_HOME", dir);
    }
    let out = f();
    // SAFETY: as above.
    unsafe {
        std::env::remove_var("XDG_CACHE_HOME");
    }
    out
}

/// A [`Logger`] whose events land in a log file under a private cache
/// directory, through a subscriber installed for the current thread only.
#[cfg(test)]
pub(crate) struct CapturedLog {
    pub(crate) log: Logger,
    _cache: tempfile::TempDir,
    _guard: tracing::dispatcher::DefaultGuard,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl CapturedLog {
    pub(crate) fn new() -> Self {
        use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

        let cache = tempfile::tempdir().expect("create cache dir");
        let (layer, log) = with_cache_home(cache.path(), || {
            (subscriber::FileLayer::new("test"), Logger::new("test"))
        });
        let layer = layer.expect("open log file");
        let dispatch = tracing::Dispatch::new(
            tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG)),
        );
        Self {
            log,
            _cache: cache,
            _guard: tracing::dispatcher::set_default(&dispatch),
        }
    }

    /// Everything written to the log file so far.
    pub(crate) fn contents(&self) -> String {
        std::fs::read_to_string(self.log.log_path()).expect("read log file")
    }
}
