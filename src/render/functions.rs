//! Functions callable from templates.
//!
//! Templates never touch process-wide state directly: host facts come from a
//! [`HostEnvironment`] handed to [`BuiltinFunctions`], and extra functions are
//! contributed through the [`FunctionRegistry`] interface.
use std::fmt;
use std::sync::Arc;

use minijinja::Environment;

/// Read-only view of the host the templates are rendered for.
#[cfg_attr(test, mockall::automock)]
pub trait HostEnvironment: Send + Sync {
    /// The host name, if it can be determined.
    fn hostname(&self) -> Option<String>;

    /// The value of an environment variable, if set and valid UTF-8.
    fn var(&self, name: &str) -> Option<String>;
}

/// [`HostEnvironment`] backed by the running system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn hostname(&self) -> Option<String> {
        nix::unistd::gethostname()
            .ok()
            .and_then(|name| name.into_string().ok())
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A set of functions that can be installed into the template environment.
pub trait FunctionRegistry {
    /// Add this registry's functions to `env`, replacing same-named ones.
    fn register(&self, env: &mut Environment<'static>);
}

/// The functions every renderer gets:
///
/// - `hostname()`: host name, empty if unknown
/// - `env(name)`: environment variable, empty if unset
pub struct BuiltinFunctions {
    host: Arc<dyn HostEnvironment>,
}

impl BuiltinFunctions {
    /// Builtins answering from `host`.
    #[must_use]
    pub fn new(host: Arc<dyn HostEnvironment>) -> Self {
        Self { host }
    }

    /// Builtins answering from the running system.
    #[must_use]
    pub fn system() -> Self {
        Self::new(Arc::new(SystemHost))
    }
}

impl fmt::Debug for BuiltinFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunctions").finish_non_exhaustive()
    }
}

impl FunctionRegistry for BuiltinFunctions {
    fn register(&self, env: &mut Environment<'static>) {
        let host = Arc::clone(&self.host);
        env.add_function("hostname", move || host.hostname().unwrap_or_default());

        let host = Arc::clone(&self.host);
        env.add_function("env", move |name: String| {
            host.var(&name).unwrap_or_default()
        });
    }
}
