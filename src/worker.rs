//! The worker engine: lifecycle events, fetch dispatch, and the control
//! channel.

use color_eyre::{eyre::eyre, Result};
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use crate::bypass::should_bypass;
use crate::cache::CacheStore;
use crate::clients::ClientRegistry;
use crate::config::WorkerConfig;
use crate::headers::with_isolation_headers;
use crate::lifecycle::WorkerState;
use crate::message::{ControlMessage, ControlReply};
use crate::net::{FetchOptions, Fetcher, Request, Response};
use crate::scope::ShellPaths;

/// The interception engine, generic over its storage and network seams.
///
/// One method per event kind; the embedder drives install → activate →
/// fetch/message in that order. Install and activate each run to completion
/// before the next phase starts.
pub struct ServiceWorker<S, F> {
  config: WorkerConfig,
  shell: ShellPaths,
  index_url: Url,
  store: Arc<S>,
  fetcher: Arc<F>,
  clients: ClientRegistry,
  state: Mutex<WorkerState>,
}

impl<S, F> ServiceWorker<S, F>
where
  S: CacheStore + 'static,
  F: Fetcher,
{
  pub fn new(config: WorkerConfig, store: S, fetcher: F) -> Result<Self> {
    let shell = ShellPaths::resolve(config.registration_scope.as_ref(), &config.origin);
    let index_url = config
      .origin
      .join(&shell.index_path)
      .map_err(|e| eyre!("Invalid index path {}: {}", shell.index_path, e))?;

    Ok(Self {
      config,
      shell,
      index_url,
      store: Arc::new(store),
      fetcher: Arc::new(fetcher),
      clients: ClientRegistry::new(),
      state: Mutex::new(WorkerState::default()),
    })
  }

  /// Version string answered over the control channel.
  pub fn version(&self) -> &str {
    &self.config.version
  }

  /// Scope-derived app shell paths.
  pub fn shell(&self) -> &ShellPaths {
    &self.shell
  }

  /// Open page clients under this worker's scope.
  pub fn clients(&self) -> &ClientRegistry {
    &self.clients
  }

  pub fn state(&self) -> WorkerState {
    // A poisoned lock means a handler panicked; treat the worker as dead.
    self.state.lock().map(|s| *s).unwrap_or(WorkerState::Redundant)
  }

  fn set_state(&self, next: WorkerState) {
    if let Ok(mut state) = self.state.lock() {
      *state = next;
    }
  }

  /// Install event: seed the current generation with the app shell.
  ///
  /// Any storage or network failure discards this worker version.
  pub async fn handle_install(&self) -> Result<()> {
    self.set_state(WorkerState::Installing);
    info!(generation = %self.config.cache_name, "installing app shell");

    match self.install_app_shell().await {
      Ok(()) => {
        self.set_state(WorkerState::Installed);
        Ok(())
      }
      Err(error) => {
        self.set_state(WorkerState::Redundant);
        Err(error)
      }
    }
  }

  async fn install_app_shell(&self) -> Result<()> {
    self.store.open(&self.config.cache_name).await?;

    for path in self.shell.app_shell() {
      let url = self
        .config
        .origin
        .join(path)
        .map_err(|e| eyre!("Invalid app shell path {}: {}", path, e))?;
      let request = Request::get(url);
      let response = self.fetcher.fetch(&request, FetchOptions::default()).await?;
      self
        .store
        .put(&self.config.cache_name, &request, &response)
        .await?;
    }

    Ok(())
  }

  /// Activate event: garbage-collect stale generations, then claim every
  /// open client. Idempotent.
  ///
  /// Stale generations are deleted concurrently; the claim only happens
  /// once every deletion has settled.
  pub async fn handle_activate(&self) -> Result<()> {
    self.set_state(WorkerState::Activating);

    let stale: Vec<String> = self
      .store
      .generations()
      .await?
      .into_iter()
      .filter(|name| name != &self.config.cache_name)
      .collect();

    if !stale.is_empty() {
      info!(count = stale.len(), "deleting stale cache generations");
    }
    let deletions = stale.iter().map(|name| self.store.delete_generation(name));
    for result in join_all(deletions).await {
      result?;
    }

    self.clients.claim()?;
    self.set_state(WorkerState::Activated);

    Ok(())
  }

  /// Fetch event. Returns `None` when the request is not intercepted and
  /// must fall through to default platform handling.
  pub async fn handle_fetch(&self, request: Request) -> Result<Option<Response>> {
    if !request.method.is_get() {
      return Ok(None);
    }

    if should_bypass(&request.url) {
      debug!(url = %request.url, "bypassing cache for versioned resource");
      let response = self.fetcher.fetch(&request, FetchOptions::no_store()).await?;
      return Ok(Some(with_isolation_headers(response)));
    }

    if request.mode.is_navigation() {
      return self.navigate(&request).await.map(Some);
    }

    self.cache_first(request).await.map(Some)
  }

  /// Navigation: network first, cached entry document as offline fallback.
  async fn navigate(&self, request: &Request) -> Result<Response> {
    match self.fetcher.fetch(request, FetchOptions::default()).await {
      Ok(response) => Ok(with_isolation_headers(response)),
      Err(error) => {
        warn!(%error, "navigation fetch failed, falling back to cached shell");
        let index = Request::get(self.index_url.clone());
        match self.store.match_request(&index).await? {
          Some(cached) => Ok(with_isolation_headers(cached)),
          None => Ok(Response::network_error()),
        }
      }
    }
  }

  /// Generic assets: cache-first with a best-effort write-through.
  async fn cache_first(&self, request: Request) -> Result<Response> {
    if let Some(cached) = self.store.match_request(&request).await? {
      debug!(url = %request.url, "cache hit");
      return Ok(with_isolation_headers(cached));
    }

    let response = self.fetcher.fetch(&request, FetchOptions::default()).await?;

    // The cached copy is taken before header augmentation so a later hit
    // replays exactly what the network sent.
    let for_cache = response.clone();
    let store = Arc::clone(&self.store);
    let generation = self.config.cache_name.clone();
    tokio::spawn(async move {
      let write = async {
        store.open(&generation).await?;
        store.put(&generation, &request, &for_cache).await
      };
      if let Err(error) = write.await {
        // Best effort: the page already has its response.
        debug!(%error, "cache write-through failed");
      }
    });

    Ok(with_isolation_headers(response))
  }

  /// Control-channel message from the page. Unknown kinds are ignored.
  pub async fn handle_message(
    &self,
    message: ControlMessage,
    reply_port: Option<oneshot::Sender<ControlReply>>,
  ) {
    match message {
      ControlMessage::GetSwVersion => {
        if let Some(port) = reply_port {
          let _ = port.send(ControlReply::SwVersion {
            value: self.config.version.clone(),
          });
        }
      }
      ControlMessage::SkipWaiting => self.skip_waiting().await,
      ControlMessage::Unknown => {}
    }
  }

  /// Promote the waiting worker to active immediately, bypassing the normal
  /// activation gating. No-op unless the worker is waiting.
  pub async fn skip_waiting(&self) {
    if !self.state().is_waiting() {
      return;
    }

    info!("skip waiting: activating immediately");
    if let Err(error) = self.handle_activate().await {
      warn!(%error, "forced activation failed");
    }
  }
}
