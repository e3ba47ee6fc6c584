//! In-memory cache store, used in tests and for embedders that do not want
//! persistence.

use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::Mutex;

use super::store::CacheStore;
use crate::net::{Request, Response};

/// Cache store backed by a process-local map. Contents do not survive the
/// process.
#[derive(Debug, Default)]
pub struct MemoryStore {
  generations: Mutex<HashMap<String, HashMap<String, Response>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, HashMap<String, Response>>>> {
    self
      .generations
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// Number of entries in a generation, if it exists.
  pub fn entry_count(&self, generation: &str) -> Result<Option<usize>> {
    Ok(self.lock()?.get(generation).map(|entries| entries.len()))
  }
}

impl CacheStore for MemoryStore {
  async fn open(&self, generation: &str) -> Result<()> {
    self.lock()?.entry(generation.to_string()).or_default();
    Ok(())
  }

  async fn generations(&self) -> Result<Vec<String>> {
    let mut names: Vec<String> = self.lock()?.keys().cloned().collect();
    names.sort();
    Ok(names)
  }

  async fn delete_generation(&self, generation: &str) -> Result<bool> {
    Ok(self.lock()?.remove(generation).is_some())
  }

  async fn get(&self, generation: &str, request: &Request) -> Result<Option<Response>> {
    Ok(
      self
        .lock()?
        .get(generation)
        .and_then(|entries| entries.get(&request.cache_key()))
        .cloned(),
    )
  }

  async fn put(&self, generation: &str, request: &Request, response: &Response) -> Result<()> {
    self
      .lock()?
      .entry(generation.to_string())
      .or_default()
      .insert(request.cache_key(), response.clone());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use url::Url;

  fn request(path: &str) -> Request {
    Request::get(Url::parse(&format!("https://example.com{}", path)).unwrap())
  }

  #[tokio::test]
  async fn test_open_creates_empty_generation() {
    let store = MemoryStore::new();

    store.open("v1").await.unwrap();

    assert_eq!(store.generations().await.unwrap(), vec!["v1"]);
    assert_eq!(store.entry_count("v1").unwrap(), Some(0));
  }

  #[tokio::test]
  async fn test_put_get_round_trip() {
    let store = MemoryStore::new();
    let request = request("/a.js");
    let response = Response::ok(b"body".to_vec());

    store.put("v1", &request, &response).await.unwrap();

    assert_eq!(store.get("v1", &request).await.unwrap(), Some(response));
    assert_eq!(store.get("v2", &request).await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_delete_generation() {
    let store = MemoryStore::new();
    store.open("v1").await.unwrap();

    assert!(store.delete_generation("v1").await.unwrap());
    assert!(!store.delete_generation("v1").await.unwrap());
    assert!(store.generations().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_match_request_searches_all_generations() {
    let store = MemoryStore::new();
    let index = request("/index.html");
    let response = Response::ok(b"<html>".to_vec());

    store.open("v2").await.unwrap();
    store.put("v1", &index, &response).await.unwrap();

    assert_eq!(store.match_request(&index).await.unwrap(), Some(response));
    assert_eq!(store.match_request(&request("/other")).await.unwrap(), None);
  }
}
