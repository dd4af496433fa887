//! Entity implementations binding each finance record to its API path.

use chrono::{DateTime, Utc};

use crate::cache::Entity;

use super::types::{
  BankAccount, Category, DashboardLayout, Import, NetWorthSnapshot, Subscription, Transaction,
};

impl Entity for BankAccount {
  fn id(&self) -> &str {
    &self.id
  }

  fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  fn entity_type() -> &'static str {
    "bank_account"
  }

  fn base_path() -> &'static str {
    "/bank-account"
  }
}

impl Entity for Transaction {
  fn id(&self) -> &str {
    &self.id
  }

  fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  fn entity_type() -> &'static str {
    "transaction"
  }

  fn base_path() -> &'static str {
    "/transaction"
  }
}

impl Entity for Category {
  fn id(&self) -> &str {
    &self.id
  }

  fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  fn entity_type() -> &'static str {
    "category"
  }

  fn base_path() -> &'static str {
    "/category"
  }
}

impl Entity for Subscription {
  fn id(&self) -> &str {
    &self.id
  }

  fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  fn entity_type() -> &'static str {
    "subscription"
  }

  fn base_path() -> &'static str {
    "/subscription"
  }
}

impl Entity for Import {
  fn id(&self) -> &str {
    &self.id
  }

  fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  fn entity_type() -> &'static str {
    "import"
  }

  fn base_path() -> &'static str {
    "/import"
  }
}

impl Entity for DashboardLayout {
  fn id(&self) -> &str {
    &self.id
  }

  fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  fn entity_type() -> &'static str {
    "dashboard_layout"
  }

  fn base_path() -> &'static str {
    "/dashboard-layout"
  }
}

impl Entity for NetWorthSnapshot {
  fn id(&self) -> &str {
    &self.id
  }

  fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  fn entity_type() -> &'static str {
    "net_worth_snapshot"
  }

  fn base_path() -> &'static str {
    "/net-worth"
  }
}
