//! Session context owning one synchronization service per finance entity.

use std::collections::BTreeMap;

use color_eyre::Result as EyreResult;
use tracing::info;

use crate::api::{ApiClient, RemoteCrud};
use crate::cache::{Entity, Store};
use crate::config::Config;
use crate::error::Result;
use crate::finance::{
  BankAccount, Category, DashboardLayout, Import, NetWorthSnapshot, Subscription, Transaction,
};

use super::service::SyncService;

/// Everything the UI needs for one logged-in session.
///
/// Built once at login and handed to whatever renders; `teardown` empties
/// every store at logout.
#[derive(Clone)]
pub struct Session {
  accounts: SyncService<BankAccount>,
  transactions: SyncService<Transaction>,
  categories: SyncService<Category>,
  subscriptions: SyncService<Subscription>,
  imports: SyncService<Import>,
  dashboard_layouts: SyncService<DashboardLayout>,
  net_worth: SyncService<NetWorthSnapshot>,
}

impl Session {
  pub fn from_config(config: &Config) -> EyreResult<Self> {
    let client = ApiClient::from_config(config)?;
    Ok(Self::with_paths(client, &config.api.paths))
  }

  /// Session using every entity's default path.
  pub fn new(client: ApiClient) -> Self {
    Self::with_paths(client, &BTreeMap::new())
  }

  /// Session with per-entity path overrides keyed by entity type name.
  pub fn with_paths(client: ApiClient, paths: &BTreeMap<String, String>) -> Self {
    Self {
      accounts: service(&client, paths),
      transactions: service(&client, paths),
      categories: service(&client, paths),
      subscriptions: service(&client, paths),
      imports: service(&client, paths),
      dashboard_layouts: service(&client, paths),
      net_worth: service(&client, paths),
    }
  }

  pub fn accounts(&self) -> &SyncService<BankAccount> {
    &self.accounts
  }

  pub fn transactions(&self) -> &SyncService<Transaction> {
    &self.transactions
  }

  pub fn categories(&self) -> &SyncService<Category> {
    &self.categories
  }

  pub fn subscriptions(&self) -> &SyncService<Subscription> {
    &self.subscriptions
  }

  pub fn imports(&self) -> &SyncService<Import> {
    &self.imports
  }

  pub fn dashboard_layouts(&self) -> &SyncService<DashboardLayout> {
    &self.dashboard_layouts
  }

  pub fn net_worth(&self) -> &SyncService<NetWorthSnapshot> {
    &self.net_worth
  }

  /// Load every collection. Fails with the first error; collections that
  /// already loaded keep their new contents.
  pub async fn refresh_all(&self) -> Result<()> {
    tokio::try_join!(
      self.accounts.fetch_all(),
      self.transactions.fetch_all(),
      self.categories.fetch_all(),
      self.subscriptions.fetch_all(),
      self.imports.fetch_all(),
      self.dashboard_layouts.fetch_all(),
      self.net_worth.fetch_all(),
    )?;
    Ok(())
  }

  /// Empty every store. The session stays usable and starts from scratch.
  pub fn teardown(&self) {
    self.accounts.clear();
    self.transactions.clear();
    self.categories.clear();
    self.subscriptions.clear();
    self.imports.clear();
    self.dashboard_layouts.clear();
    self.net_worth.clear();
    info!("session stores cleared");
  }
}

fn service<T: Entity>(client: &ApiClient, paths: &BTreeMap<String, String>) -> SyncService<T> {
  let remote = match paths.get(T::entity_type()) {
    Some(path) => RemoteCrud::with_path(client.clone(), path.as_str()),
    None => RemoteCrud::new(client.clone()),
  };
  SyncService::from_parts(remote, Store::new())
}
