//! Network fetch seam and the reqwest-backed implementation.

use color_eyre::{eyre::eyre, Result};
use std::future::Future;

use super::types::{Headers, Request, Response, ResponseKind};

/// Per-fetch transport options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
  /// Disable every intermediate caching layer for this fetch
  pub no_store: bool,
}

impl FetchOptions {
  pub fn no_store() -> Self {
    Self { no_store: true }
  }
}

/// Network seam for the dispatcher.
///
/// A failed fetch is a hard error; retries and fallbacks are policy
/// decisions made by the dispatcher, never by the fetcher.
pub trait Fetcher: Send + Sync {
  fn fetch(
    &self,
    request: &Request,
    options: FetchOptions,
  ) -> impl Future<Output = Result<Response>> + Send;
}

/// Fetcher backed by a shared reqwest client.
#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new() -> Result<Self> {
    let client = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }
}

impl Fetcher for HttpFetcher {
  async fn fetch(&self, request: &Request, options: FetchOptions) -> Result<Response> {
    let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
      .map_err(|e| eyre!("Invalid method {}: {}", request.method.as_str(), e))?;

    let mut builder = self.client.request(method, request.url.clone());
    for (name, value) in request.headers.iter() {
      builder = builder.header(name, value);
    }
    if options.no_store {
      builder = builder.header(reqwest::header::CACHE_CONTROL, "no-store");
    }

    let response = builder
      .send()
      .await
      .map_err(|e| eyre!("Fetch failed for {}: {}", request.url, e))?;

    let status = response.status();
    let mut headers = Headers::new();
    for (name, value) in response.headers() {
      if let Ok(value) = value.to_str() {
        headers.append(name.as_str(), value);
      }
    }

    let body = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read body for {}: {}", request.url, e))?
      .to_vec();

    Ok(Response {
      status: status.as_u16(),
      status_text: status.canonical_reason().unwrap_or_default().to_string(),
      headers,
      body,
      // reqwest performs no CORS filtering, so every response is readable
      kind: ResponseKind::Basic,
    })
  }
}
