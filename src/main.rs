use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

use iidx_sw::cache::SqliteStore;
use iidx_sw::net::{HttpFetcher, Request};
use iidx_sw::{ServiceWorker, WorkerConfig};

#[derive(Parser, Debug)]
#[command(name = "iidx-sw")]
#[command(about = "Offline app-shell cache engine for the IIDX song-master viewer")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/iidx-sw/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Install the app shell into the current generation and activate it
  Install,
  /// Dispatch one request through the interception engine
  Fetch {
    url: String,

    /// Treat the request as a full-document navigation
    #[arg(long)]
    navigate: bool,
  },
  /// Show cache generations with entry counts and freshness
  Status,
  /// Print the worker version
  Version,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  // Logs go to stderr so `fetch` can stream a body to stdout.
  let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(writer)
    .init();

  let args = Args::parse();
  let config = WorkerConfig::load(args.config.as_deref())?;

  if let Command::Version = args.command {
    println!("{}", config.version);
    return Ok(());
  }

  let store = match &config.cache_db {
    Some(path) => SqliteStore::open(path)?,
    None => SqliteStore::open_default()?,
  };

  if let Command::Status = args.command {
    for stats in store.generation_stats()? {
      let freshness = stats
        .last_cached_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
      println!("{}\t{} entries\tlast cached {}", stats.name, stats.entries, freshness);
    }
    return Ok(());
  }

  let fetcher = HttpFetcher::new()?;
  let worker = ServiceWorker::new(config, store, fetcher)?;

  match args.command {
    Command::Install => {
      worker.handle_install().await?;
      worker.handle_activate().await?;
      println!("installed app shell: {:?}", worker.shell().app_shell());
    }
    Command::Fetch { url, navigate } => {
      let url = Url::parse(&url).map_err(|e| eyre!("Invalid URL {}: {}", url, e))?;
      let request = if navigate {
        Request::navigate(url)
      } else {
        Request::get(url)
      };

      match worker.handle_fetch(request).await? {
        Some(response) => {
          eprintln!("{} {}", response.status, response.status_text);
          for (name, value) in response.headers.iter() {
            eprintln!("{}: {}", name, value);
          }
          std::io::stdout()
            .write_all(&response.body)
            .map_err(|e| eyre!("Failed to write body: {}", e))?;
        }
        None => eprintln!("request not intercepted"),
      }
    }
    Command::Version | Command::Status => unreachable!(),
  }

  Ok(())
}
