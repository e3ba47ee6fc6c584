//! Cache-bypass classification for song-master data files.
//!
//! The song master is versioned externally (published as GitHub release
//! assets and optionally mirrored next to the app), so serving it stale
//! from the cache would pin users to outdated song data. Matching URLs are
//! always fetched fresh with transport caching disabled.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static GITHUB_LATEST_JSON_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^/tts1374/iidx_all_songs_master/releases/latest/download/latest\.json$")
    .expect("valid pattern")
});

static GITHUB_SQLITE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)^/tts1374/iidx_all_songs_master/releases/latest/download/.+\.sqlite$")
    .expect("valid pattern")
});

static LOCAL_LATEST_JSON_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"/song-master/latest\.json$").expect("valid pattern"));

static LOCAL_SQLITE_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)/song-master/.+\.sqlite$").expect("valid pattern"));

/// Whether the request must skip the cache entirely.
///
/// Only the URL's path component is examined; query and fragment never
/// affect the decision.
pub fn should_bypass(url: &Url) -> bool {
  let path = url.path();

  GITHUB_LATEST_JSON_RE.is_match(path)
    || GITHUB_SQLITE_RE.is_match(path)
    || LOCAL_LATEST_JSON_RE.is_match(path)
    || LOCAL_SQLITE_RE.is_match(path)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
  }

  #[test]
  fn test_github_latest_json() {
    assert!(should_bypass(&url(
      "https://github.com/tts1374/iidx_all_songs_master/releases/latest/download/latest.json"
    )));
  }

  #[test]
  fn test_github_sqlite_any_filename() {
    assert!(should_bypass(&url(
      "https://github.com/tts1374/iidx_all_songs_master/releases/latest/download/songs_v12.sqlite"
    )));
  }

  #[test]
  fn test_sqlite_extension_is_case_insensitive() {
    assert!(should_bypass(&url(
      "https://github.com/tts1374/iidx_all_songs_master/releases/latest/download/SONGS.SQLITE"
    )));
    assert!(should_bypass(&url(
      "https://example.com/app/song-master/Songs.Sqlite"
    )));
  }

  #[test]
  fn test_local_mirror_latest_json() {
    assert!(should_bypass(&url(
      "https://example.com/app/song-master/latest.json"
    )));
  }

  #[test]
  fn test_local_mirror_sqlite() {
    assert!(should_bypass(&url(
      "https://example.com/song-master/songs.sqlite"
    )));
  }

  #[test]
  fn test_query_string_does_not_affect_match() {
    assert!(should_bypass(&url(
      "https://example.com/song-master/latest.json?ts=123"
    )));
  }

  #[test]
  fn test_github_pattern_is_anchored() {
    // Same suffix under a different repo path must not match
    assert!(!should_bypass(&url(
      "https://github.com/other/repo/releases/latest/download/latest.json"
    )));
    assert!(!should_bypass(&url(
      "https://github.com/prefix/tts1374/iidx_all_songs_master/releases/latest/download/latest.json"
    )));
  }

  #[test]
  fn test_latest_json_name_is_not_case_insensitive() {
    assert!(!should_bypass(&url(
      "https://example.com/song-master/LATEST.JSON"
    )));
  }

  #[test]
  fn test_unrelated_assets_are_cached() {
    assert!(!should_bypass(&url("https://example.com/app/index.html")));
    assert!(!should_bypass(&url(
      "https://example.com/app/song-master/readme.txt"
    )));
    assert!(!should_bypass(&url("https://example.com/app/latest.json")));
  }
}
