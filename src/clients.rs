//! Open page clients and the claim operation.

use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// An open page under the worker's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
  pub id: String,
  pub url: Url,
  /// Whether this worker controls the client's requests
  pub controlled: bool,
}

impl Client {
  pub fn new(id: impl Into<String>, url: Url) -> Self {
    Self {
      id: id.into(),
      url,
      controlled: false,
    }
  }
}

/// Registry of open clients. Claiming makes the worker control every open
/// client without requiring a page reload.
#[derive(Debug, Default)]
pub struct ClientRegistry {
  clients: Mutex<HashMap<String, Client>>,
}

impl ClientRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Client>>> {
    self.clients.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  pub fn add(&self, client: Client) -> Result<()> {
    self.lock()?.insert(client.id.clone(), client);
    Ok(())
  }

  pub fn remove(&self, id: &str) -> Result<Option<Client>> {
    Ok(self.lock()?.remove(id))
  }

  pub fn get(&self, id: &str) -> Result<Option<Client>> {
    Ok(self.lock()?.get(id).cloned())
  }

  /// Mark every open client as controlled by this worker.
  pub fn claim(&self) -> Result<()> {
    for client in self.lock()?.values_mut() {
      client.controlled = true;
    }
    Ok(())
  }

  /// All clients, in no particular order.
  pub fn all(&self) -> Result<Vec<Client>> {
    Ok(self.lock()?.values().cloned().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(id: &str) -> Client {
    Client::new(id, Url::parse("https://example.com/app/").unwrap())
  }

  #[test]
  fn test_add_and_get() {
    let registry = ClientRegistry::new();
    registry.add(client("tab-1")).unwrap();

    let fetched = registry.get("tab-1").unwrap().unwrap();
    assert!(!fetched.controlled);
    assert!(registry.get("tab-2").unwrap().is_none());
  }

  #[test]
  fn test_claim_controls_every_client() {
    let registry = ClientRegistry::new();
    registry.add(client("tab-1")).unwrap();
    registry.add(client("tab-2")).unwrap();

    registry.claim().unwrap();

    assert!(registry.all().unwrap().iter().all(|c| c.controlled));
  }

  #[test]
  fn test_remove() {
    let registry = ClientRegistry::new();
    registry.add(client("tab-1")).unwrap();

    assert!(registry.remove("tab-1").unwrap().is_some());
    assert!(registry.all().unwrap().is_empty());
  }
}
