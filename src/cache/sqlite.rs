//! SQLite-backed cache store.
//!
//! Entries are serialized responses stored as JSON blobs, one row per
//! request identity, grouped into generations that can be dropped
//! wholesale.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::store::CacheStore;
use crate::net::{Request, Response};

/// Per-generation summary used by the CLI `status` command.
#[derive(Debug, Clone)]
pub struct GenerationStats {
  pub name: String,
  pub entries: usize,
  pub last_cached_at: Option<DateTime<Utc>>,
}

/// Persistent cache store over a single SQLite database.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open or create the store at the default location.
  pub fn open_default() -> Result<Self> {
    Self::open(&Self::default_path()?)
  }

  /// Open or create the store at the given path.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// In-memory store for tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;

    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Get the default database path.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("iidx-sw").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// Per-generation entry counts and freshness, for inspection.
  pub fn generation_stats(&self) -> Result<Vec<GenerationStats>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare(
        "SELECT g.name, COUNT(e.entry_key), MAX(e.cached_at)
         FROM generations g
         LEFT JOIN cache_entries e ON e.generation = g.name
         GROUP BY g.name
         ORDER BY g.created_at",
      )
      .map_err(|e| eyre!("Failed to prepare stats query: {}", e))?;

    let rows: Vec<(String, usize, Option<String>)> = stmt
      .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
      .map_err(|e| eyre!("Failed to query stats: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    let mut stats = Vec::with_capacity(rows.len());
    for (name, entries, last) in rows {
      let last_cached_at = match last {
        Some(s) => Some(parse_datetime(&s)?),
        None => None,
      };
      stats.push(GenerationStats {
        name,
        entries,
        last_cached_at,
      });
    }

    Ok(stats)
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- Named cache generations; dropped wholesale on version bumps
CREATE TABLE IF NOT EXISTS generations (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per request identity (serialized response as JSON)
CREATE TABLE IF NOT EXISTS cache_entries (
    generation TEXT NOT NULL,
    entry_key TEXT NOT NULL,
    url TEXT NOT NULL,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (generation, entry_key)
);

CREATE INDEX IF NOT EXISTS idx_cache_entries_generation ON cache_entries(generation);
"#;

impl CacheStore for SqliteStore {
  async fn open(&self, generation: &str) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR IGNORE INTO generations (name) VALUES (?)",
        params![generation],
      )
      .map_err(|e| eyre!("Failed to open generation {}: {}", generation, e))?;

    Ok(())
  }

  async fn generations(&self) -> Result<Vec<String>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare("SELECT name FROM generations ORDER BY created_at, name")
      .map_err(|e| eyre!("Failed to prepare generations query: {}", e))?;

    let names: Vec<String> = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list generations: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(names)
  }

  async fn delete_generation(&self, generation: &str) -> Result<bool> {
    let conn = self.lock()?;

    conn
      .execute(
        "DELETE FROM cache_entries WHERE generation = ?",
        params![generation],
      )
      .map_err(|e| eyre!("Failed to delete entries of {}: {}", generation, e))?;

    let deleted = conn
      .execute("DELETE FROM generations WHERE name = ?", params![generation])
      .map_err(|e| eyre!("Failed to delete generation {}: {}", generation, e))?;

    Ok(deleted > 0)
  }

  async fn get(&self, generation: &str, request: &Request) -> Result<Option<Response>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare("SELECT data FROM cache_entries WHERE generation = ? AND entry_key = ?")
      .map_err(|e| eyre!("Failed to prepare entry query: {}", e))?;

    let data: Option<Vec<u8>> = stmt
      .query_row(params![generation, request.cache_key()], |row| row.get(0))
      .ok();

    match data {
      Some(data) => {
        let response: Response = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize cached response: {}", e))?;
        Ok(Some(response))
      }
      None => Ok(None),
    }
  }

  async fn put(&self, generation: &str, request: &Request, response: &Response) -> Result<()> {
    let data =
      serde_json::to_vec(response).map_err(|e| eyre!("Failed to serialize response: {}", e))?;

    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR IGNORE INTO generations (name) VALUES (?)",
        params![generation],
      )
      .map_err(|e| eyre!("Failed to open generation {}: {}", generation, e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO cache_entries (generation, entry_key, url, data, cached_at)
         VALUES (?, ?, ?, ?, datetime('now'))",
        params![generation, request.cache_key(), request.url.as_str(), data],
      )
      .map_err(|e| eyre!("Failed to store entry: {}", e))?;

    Ok(())
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use url::Url;

  fn request(path: &str) -> Request {
    Request::get(Url::parse(&format!("https://example.com{}", path)).unwrap())
  }

  #[tokio::test]
  async fn test_open_and_list_generations() {
    let store = SqliteStore::open_in_memory().unwrap();

    store.open("iidx-app-shell-v1").await.unwrap();
    store.open("iidx-app-shell-v2").await.unwrap();
    // Opening twice is a no-op
    store.open("iidx-app-shell-v1").await.unwrap();

    assert_eq!(
      store.generations().await.unwrap(),
      vec!["iidx-app-shell-v1", "iidx-app-shell-v2"]
    );
  }

  #[tokio::test]
  async fn test_put_get_round_trip_is_byte_identical() {
    let store = SqliteStore::open_in_memory().unwrap();
    let request = request("/app/song.json");
    let mut response = Response::ok(vec![0, 159, 146, 150]);
    response
      .headers
      .set("Content-Type", "application/octet-stream");

    store.put("v2", &request, &response).await.unwrap();

    assert_eq!(store.get("v2", &request).await.unwrap(), Some(response));
  }

  #[tokio::test]
  async fn test_get_misses_other_generation() {
    let store = SqliteStore::open_in_memory().unwrap();
    let request = request("/a.js");

    store.put("v1", &request, &Response::ok(Vec::new())).await.unwrap();

    assert_eq!(store.get("v2", &request).await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_delete_generation_removes_entries() {
    let store = SqliteStore::open_in_memory().unwrap();
    let request = request("/a.js");

    store.put("v1", &request, &Response::ok(Vec::new())).await.unwrap();

    assert!(store.delete_generation("v1").await.unwrap());
    assert!(!store.delete_generation("v1").await.unwrap());
    assert_eq!(store.get("v1", &request).await.unwrap(), None);
    assert!(store.generations().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_match_request_across_generations() {
    let store = SqliteStore::open_in_memory().unwrap();
    let index = request("/index.html");
    let response = Response::ok(b"<html>".to_vec());

    store.open("v2").await.unwrap();
    store.put("v1", &index, &response).await.unwrap();

    assert_eq!(store.match_request(&index).await.unwrap(), Some(response));
  }

  #[tokio::test]
  async fn test_generation_stats() {
    let store = SqliteStore::open_in_memory().unwrap();

    store.open("v1").await.unwrap();
    store
      .put("v2", &request("/a.js"), &Response::ok(Vec::new()))
      .await
      .unwrap();

    let stats = store.generation_stats().unwrap();
    assert_eq!(stats.len(), 2);

    let v1 = stats.iter().find(|s| s.name == "v1").unwrap();
    assert_eq!(v1.entries, 0);
    assert!(v1.last_cached_at.is_none());

    let v2 = stats.iter().find(|s| s.name == "v2").unwrap();
    assert_eq!(v2.entries, 1);
    assert!(v2.last_cached_at.is_some());
  }
}
