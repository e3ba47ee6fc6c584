//! Cross-origin isolation header rewriting.
//!
//! The app uses features that require a cross-origin-isolated context
//! (SharedArrayBuffer-backed sqlite), so every response handed to the page
//! carries the isolation headers regardless of what the origin server sent.

use crate::net::Response;

pub const EMBEDDER_POLICY: (&str, &str) = ("Cross-Origin-Embedder-Policy", "require-corp");
pub const OPENER_POLICY: (&str, &str) = ("Cross-Origin-Opener-Policy", "same-origin");
pub const RESOURCE_POLICY: (&str, &str) = ("Cross-Origin-Resource-Policy", "cross-origin");

/// Force-set the isolation headers on a response.
///
/// Opaque responses and the status-0 network-error sentinel are returned
/// unchanged: their headers are not readable, and rewriting them is
/// meaningless.
pub fn with_isolation_headers(response: Response) -> Response {
  if response.is_opaque() || response.is_network_error() {
    return response;
  }

  let mut response = response;
  response.headers.set(EMBEDDER_POLICY.0, EMBEDDER_POLICY.1);
  response.headers.set(OPENER_POLICY.0, OPENER_POLICY.1);
  response.headers.set(RESOURCE_POLICY.0, RESOURCE_POLICY.1);
  response
}
