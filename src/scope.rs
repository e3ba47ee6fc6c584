//! Registration-scope resolution for the app shell.
//!
//! The worker can be registered under any sub-path; the app shell paths are
//! derived from the registration scope rather than hardcoded so the same
//! worker serves `/` and `/app/` deployments alike.

use url::Url;

/// Canonical app shell paths derived from the registration scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellPaths {
  /// Scope root path, always ending in `/`
  pub scope_path: String,
  /// Entry document path (`<scope>index.html`)
  pub index_path: String,
}

impl ShellPaths {
  /// Resolve the shell paths from the effective registration scope, falling
  /// back to the origin root when no scope is available.
  pub fn resolve(registration_scope: Option<&Url>, origin: &Url) -> Self {
    let raw = match registration_scope {
      Some(scope) => scope.path(),
      None => origin.path(),
    };

    let scope_path = if raw.ends_with('/') {
      raw.to_string()
    } else {
      format!("{}/", raw)
    };
    let index_path = format!("{}index.html", scope_path);

    Self {
      scope_path,
      index_path,
    }
  }

  /// The ordered set of paths cached at install time.
  pub fn app_shell(&self) -> [&str; 2] {
    [&self.scope_path, &self.index_path]
  }
}
