mod cache;
mod config;
mod db;
mod logging;
mod notify;
mod staffing;
mod sync;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cache::{CacheLayer, CacheResult, CacheSource, SqliteStorage};
use config::Config;
use db::Database;
use notify::{DisabledNotifier, Notifier, SmtpNotifier, SqliteSubscriberStore, SubscriberStore};
use staffing::client::StaffingClient;
use staffing::types::{Job, JobList};
use sync::JobService;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "staffwatch")]
#[command(about = "Watches a staffing API for new and closed jobs and emails subscribers")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/staffwatch/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run one synchronization cycle and print the change report
  Sync,
  /// Run synchronization cycles periodically until interrupted
  Watch {
    /// Seconds between cycles (overrides sync.interval_secs)
    #[arg(short, long)]
    interval: Option<u64>,
  },
  /// List current jobs, from the cache when available
  Jobs {
    /// Fetch from the API even if the cache holds a list
    #[arg(short, long)]
    refresh: bool,
    /// Print the list as JSON
    #[arg(long)]
    json: bool,
  },
  /// Compare two job list JSON files (each an array or null) offline
  Compare { old: PathBuf, new: PathBuf },
  /// Manage notification subscribers
  Subscribers {
    #[command(subcommand)]
    action: SubscribersAction,
  },
}

#[derive(Subcommand, Debug)]
enum SubscribersAction {
  /// List subscribers
  List,
  /// Subscribe an email address
  Add { email: String },
  /// Unsubscribe an email address
  Remove { email: String },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  match args.command {
    // Offline comparison needs neither config nor database
    Command::Compare { old, new } => compare_files(&old, &new),
    Command::Subscribers { action } => {
      let (_config, db, _log_guard) = setup(args.config.as_deref())?;
      manage_subscribers(&SqliteSubscriberStore::new(db), &action)
    }
    Command::Sync => {
      let (config, db, _log_guard) = setup(args.config.as_deref())?;
      let service = build_service(&config, db)?;

      let report = service.synchronize().await?;
      println!("{}", serde_json::to_string_pretty(&report)?);
      Ok(())
    }
    Command::Watch { interval } => {
      let (config, db, _log_guard) = setup(args.config.as_deref())?;
      let service = build_service(&config, db)?;

      let period = Duration::from_secs(interval.unwrap_or(config.sync.interval_secs).max(1));
      let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
          tracing::error!(error = %e, "Failed to listen for Ctrl-C");
          std::future::pending::<()>().await;
        }
      };
      sync::run_periodic(&service, period, shutdown).await;
      Ok(())
    }
    Command::Jobs { refresh, json } => {
      let (config, db, _log_guard) = setup(args.config.as_deref())?;
      let service = build_service(&config, db)?;

      let result = if refresh {
        CacheResult::from_network(service.fetch_and_cache().await?)
      } else {
        service.get_jobs().await?
      };

      if json {
        println!("{}", serde_json::to_string_pretty(&result.data)?);
      } else {
        print_jobs(&result.data);
      }

      match (result.source, result.cached_at) {
        (CacheSource::Cache, Some(at)) => eprintln!("{} jobs (cached {})", result.data.len(), at),
        _ => eprintln!("{} jobs (fetched)", result.data.len()),
      }
      Ok(())
    }
  }
}

/// Load config, start logging and open the database
fn setup(config_path: Option<&Path>) -> Result<(Config, Arc<Database>, Option<WorkerGuard>)> {
  let config = Config::load(config_path)?;
  let log_guard = logging::init(config.log_file.as_deref())?;
  let db = Arc::new(Database::open(config.database.as_deref())?);
  Ok((config, db, log_guard))
}

fn build_service(config: &Config, db: Arc<Database>) -> Result<JobService<SqliteStorage>> {
  let source = Arc::new(StaffingClient::new(&config.api, Config::get_client_secret()?)?);
  let cache = CacheLayer::new(SqliteStorage::new(db.clone()));
  let subscribers: Arc<dyn SubscriberStore> = Arc::new(SqliteSubscriberStore::new(db));

  let notifier: Arc<dyn Notifier> = match &config.mail {
    Some(mail) => Arc::new(SmtpNotifier::new(mail, Config::get_smtp_password()?)?),
    None => {
      tracing::warn!("No mail section configured, change notifications are disabled");
      Arc::new(DisabledNotifier)
    }
  };

  Ok(JobService::new(source, cache, subscribers, notifier))
}

fn manage_subscribers(store: &dyn SubscriberStore, action: &SubscribersAction) -> Result<()> {
  match action {
    SubscribersAction::List => {
      for subscriber in store.all()? {
        println!("{}\t{}", subscriber.email(), subscriber.created_at);
      }
    }
    SubscribersAction::Add { email } => {
      if store.add(email)? {
        println!("Subscribed {}", email);
      } else {
        println!("{} is already subscribed", email);
      }
    }
    SubscribersAction::Remove { email } => {
      if !store.remove(email)? {
        return Err(eyre!("{} is not subscribed", email));
      }
      println!("Unsubscribed {}", email);
    }
  }
  Ok(())
}

fn compare_files(old: &Path, new: &Path) -> Result<()> {
  let old = read_job_list(old)?;
  let new = read_job_list(new)?;

  let report = sync::compare(new.as_deref(), old.as_deref());
  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}

/// Read a job list file; a JSON `null` means "no list".
fn read_job_list(path: &Path) -> Result<Option<JobList>> {
  let contents = std::fs::read_to_string(path)
    .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))?;
  serde_json::from_str(&contents).map_err(|e| eyre!("Failed to parse {}: {}", path.display(), e))
}

fn print_jobs(jobs: &[Job]) {
  for job in jobs {
    println!(
      "{:<12} {:<40} {}",
      job.activity.id.as_deref().unwrap_or("-"),
      job.activity.title,
      job.project.name
    );
  }
}
