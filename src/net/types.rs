//! Request and response model used by the interception layer.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Request method. Only GET requests are ever intercepted, but the model
/// carries the full method so passthrough decisions stay explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
  Get,
  Head,
  Post,
  Put,
  Delete,
  Options,
  Patch,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Head => "HEAD",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Delete => "DELETE",
      Method::Options => "OPTIONS",
      Method::Patch => "PATCH",
    }
  }

  pub fn is_get(&self) -> bool {
    matches!(self, Method::Get)
  }
}

/// How the request was initiated by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
  /// Full-document navigation
  Navigate,
  SameOrigin,
  #[default]
  Cors,
  NoCors,
}

impl RequestMode {
  pub fn is_navigation(&self) -> bool {
    matches!(self, RequestMode::Navigate)
  }
}

/// Header map with case-insensitive names and set-replace semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
    Self(
      pairs
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect(),
    )
  }

  /// First value for the given name, if any.
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  /// Set a header, replacing every existing value under the same name.
  pub fn set(&mut self, name: &str, value: &str) {
    self.0.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    self.0.push((name.to_string(), value.to_string()));
  }

  /// Append a value without touching existing ones (e.g. `Set-Cookie`).
  pub fn append(&mut self, name: &str, value: &str) {
    self.0.push((name.to_string(), value.to_string()));
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
  pub method: Method,
  pub url: Url,
  pub mode: RequestMode,
  pub headers: Headers,
}

impl Request {
  /// A plain GET request.
  pub fn get(url: Url) -> Self {
    Self {
      method: Method::Get,
      url,
      mode: RequestMode::default(),
      headers: Headers::new(),
    }
  }

  /// A full-document navigation request.
  pub fn navigate(url: Url) -> Self {
    Self {
      mode: RequestMode::Navigate,
      ..Self::get(url)
    }
  }

  /// Stable, fixed-length cache key for this request's identity
  /// (method + URL), SHA-256 hashed.
  pub fn cache_key(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.method.as_str().as_bytes());
    hasher.update(b" ");
    hasher.update(self.url.as_str().as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// Response classification as seen by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
  /// Same-origin response, headers fully visible
  #[default]
  Basic,
  /// Cross-origin response obtained through CORS
  Cors,
  /// Cross-origin no-cors response; headers and body are not readable
  Opaque,
}

/// A response returned to the page or stored in a cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
  pub status: u16,
  pub status_text: String,
  pub headers: Headers,
  pub body: Vec<u8>,
  pub kind: ResponseKind,
}

impl Response {
  /// A 200 OK response with the given body.
  pub fn ok(body: Vec<u8>) -> Self {
    Self {
      status: 200,
      status_text: "OK".to_string(),
      headers: Headers::new(),
      body,
      kind: ResponseKind::Basic,
    }
  }

  /// The status-0 sentinel a page receives when the network failed and no
  /// fallback was available.
  pub fn network_error() -> Self {
    Self {
      status: 0,
      status_text: String::new(),
      headers: Headers::new(),
      body: Vec::new(),
      kind: ResponseKind::Basic,
    }
  }

  pub fn is_network_error(&self) -> bool {
    self.status == 0
  }

  pub fn is_opaque(&self) -> bool {
    self.kind == ResponseKind::Opaque
  }
}
