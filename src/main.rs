use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

use fintrack::api::MultipartForm;
use fintrack::cache::Entity;
use fintrack::commands::{self, ResourceKind};
use fintrack::config::Config;
use fintrack::finance::{
  BankAccountFilter, CategoryFilter, ImportFilter, NetWorthFilter, SubscriptionFilter,
  TransactionFilter,
};
use fintrack::logging;
use fintrack::sync::{Session, SyncService};

#[derive(Parser, Debug)]
#[command(name = "fintrack")]
#[command(about = "Command-line client for the personal-finance tracking API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/fintrack/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Log debug output to stderr
  #[arg(short, long)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show the resource names and aliases
  Resources,
  /// Fetch a collection and print it
  List {
    resource: String,
    /// Filter as KEY=VALUE, repeatable; KEY may be outer.inner
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    filters: Vec<String>,
  },
  /// Print one record
  Get {
    resource: String,
    id: String,
    /// Ask the server directly instead of the loaded collection
    #[arg(long)]
    fresh: bool,
  },
  /// Create a record from a JSON object
  Create {
    resource: String,
    #[arg(short, long)]
    data: String,
  },
  /// Update a record with a JSON object
  Update {
    resource: String,
    id: String,
    #[arg(short, long)]
    data: String,
  },
  /// Delete a record
  Delete { resource: String, id: String },
  /// Upload a CSV statement into a bank account
  Import {
    bank_account_id: String,
    file: PathBuf,
  },
  /// Upload a logo image for a bank account, optionally with other fields
  AccountLogo {
    id: String,
    file: PathBuf,
    /// JSON object sent as form fields next to the logo
    #[arg(short, long)]
    data: Option<String>,
  },
}

/// What to do with whichever collection the resource names.
enum Action {
  List(Map<String, Value>),
  Get { id: String, fresh: bool },
  Create(Value),
  Update { id: String, data: Value },
  Delete(String),
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Listing resources needs neither config nor network
  if let Command::Resources = args.command {
    println!("{}", serde_json::to_string_pretty(&resources())?);
    return Ok(());
  }

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  let log_dir = config.log_dir();
  let _guard = logging::init(
    log_dir.as_deref(),
    config.log.level.as_deref().unwrap_or("info"),
    args.verbose,
  )?;

  let session = Session::from_config(&config)?;
  let output = execute(&session, args.command).await;
  session.teardown();

  println!("{}", serde_json::to_string_pretty(&output?)?);
  Ok(())
}

async fn execute(session: &Session, command: Command) -> Result<Value> {
  let (resource, action) = match command {
    Command::Resources => return Ok(resources()),
    Command::List { resource, filters } => (resource, Action::List(commands::parse_filter(&filters)?)),
    Command::Get {
      resource,
      id,
      fresh,
    } => (resource, Action::Get { id, fresh }),
    Command::Create { resource, data } => (resource, Action::Create(commands::parse_data(&data)?)),
    Command::Update { resource, id, data } => (
      resource,
      Action::Update {
        id,
        data: commands::parse_data(&data)?,
      },
    ),
    Command::Delete { resource, id } => (resource, Action::Delete(id)),
    Command::Import {
      bank_account_id,
      file,
    } => {
      let form = attachment_form(MultipartForm::new(), &file, "file")
        .await?
        .text("bankAccountId", bank_account_id);
      let import = session.imports().create(form).await?;
      return Ok(serde_json::to_value(import)?);
    }
    Command::AccountLogo { id, file, data } => {
      let fields = match data {
        Some(raw) => commands::parse_data(&raw)?,
        None => json!({}),
      };
      let form = attachment_form(MultipartForm::from_record(&fields)?, &file, "logo").await?;
      let account = session.accounts().update(&id, form).await?;
      return Ok(serde_json::to_value(account)?);
    }
  };

  let res = commands::resolve(&resource).ok_or_else(|| {
    eyre!(
      "Unknown resource '{}'. Run `fintrack resources` for the list.",
      resource
    )
  })?;

  match res.kind {
    ResourceKind::Accounts => run::<_, BankAccountFilter>(session.accounts(), action).await,
    ResourceKind::Transactions => {
      run::<_, TransactionFilter>(session.transactions(), action).await
    }
    ResourceKind::Categories => run::<_, CategoryFilter>(session.categories(), action).await,
    ResourceKind::Subscriptions => {
      run::<_, SubscriptionFilter>(session.subscriptions(), action).await
    }
    ResourceKind::Imports => run::<_, ImportFilter>(session.imports(), action).await,
    // Layouts have no typed filter; keys go to the server as given
    ResourceKind::DashboardLayouts => {
      run::<_, Map<String, Value>>(session.dashboard_layouts(), action).await
    }
    ResourceKind::NetWorth => run::<_, NetWorthFilter>(session.net_worth(), action).await,
  }
}

fn resources() -> Value {
  commands::RESOURCES
    .iter()
    .map(|res| {
      json!({
        "name": res.name,
        "aliases": res.aliases,
        "description": res.description,
      })
    })
    .collect()
}

async fn run<T, F>(service: &SyncService<T>, action: Action) -> Result<Value>
where
  T: Entity,
  F: DeserializeOwned + Serialize,
{
  match action {
    Action::List(raw) => {
      let filter: F = commands::typed_filter(raw)?;
      service.fetch(&filter).await?;
      Ok(serde_json::to_value(service.list())?)
    }
    Action::Get { id, fresh } => {
      if !fresh {
        service.fetch_all().await?;
      }
      let result = service.read_one(&id, fresh).await?;
      match result.data {
        Some(entity) => Ok(serde_json::to_value(entity)?),
        None => Err(eyre!("{} {} not found", T::entity_type(), id)),
      }
    }
    Action::Create(data) => Ok(serde_json::to_value(service.create(data).await?)?),
    Action::Update { id, data } => Ok(serde_json::to_value(service.update(&id, data).await?)?),
    Action::Delete(id) => {
      service.delete(&id).await?;
      Ok(json!({ "deleted": id }))
    }
  }
}

async fn attachment_form(form: MultipartForm, file: &Path, field: &str) -> Result<MultipartForm> {
  let bytes = tokio::fs::read(file)
    .await
    .map_err(|e| eyre!("Failed to read {}: {}", file.display(), e))?;
  let file_name = file
    .file_name()
    .and_then(|n| n.to_str())
    .ok_or_else(|| eyre!("Invalid file name: {}", file.display()))?
    .to_string();
  let mime = commands::mime_for(&file_name);

  Ok(form.file(field, file_name, mime, bytes))
}
