//! Cache store trait: versioned generations of request/response entries.

use color_eyre::Result;
use std::future::Future;

use crate::net::{Request, Response};

/// Storage backend for cache generations.
///
/// A generation is a named, wholesale-replaceable namespace of
/// request-key → response entries. Individual operations are atomic;
/// nothing spans multiple entries transactionally.
pub trait CacheStore: Send + Sync {
  /// Open a generation, creating it if absent.
  fn open(&self, generation: &str) -> impl Future<Output = Result<()>> + Send;

  /// Names of every existing generation.
  fn generations(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

  /// Delete a whole generation. Returns whether it existed.
  fn delete_generation(&self, generation: &str) -> impl Future<Output = Result<bool>> + Send;

  /// Look up a response by request identity within one generation.
  fn get(
    &self,
    generation: &str,
    request: &Request,
  ) -> impl Future<Output = Result<Option<Response>>> + Send;

  /// Store a response under the request's identity.
  fn put(
    &self,
    generation: &str,
    request: &Request,
    response: &Response,
  ) -> impl Future<Output = Result<()>> + Send;

  /// Look up a request across every generation, mirroring the platform's
  /// global cache match.
  fn match_request(
    &self,
    request: &Request,
  ) -> impl Future<Output = Result<Option<Response>>> + Send {
    async move {
      for generation in self.generations().await? {
        if let Some(response) = self.get(&generation, request).await? {
          return Ok(Some(response));
        }
      }
      Ok(None)
    }
  }
}
