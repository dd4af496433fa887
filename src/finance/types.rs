use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Bank account, card, wallet or any other balance holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub title: String,
  #[serde(rename = "type")]
  pub account_type: AccountType,
  #[serde(default)]
  pub balance: f64,
  #[serde(default = "default_currency")]
  pub currency: String,
  /// URL of the uploaded logo image
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub logo: Option<String>,
  #[serde(default)]
  pub archived: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
  BankAccount,
  CreditCard,
  Cash,
  Investment,
  Loan,
  Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub title: String,
  pub amount: f64,
  #[serde(rename = "type")]
  pub transaction_type: TransactionType,
  /// Booking date, distinct from when the record was created
  pub date: NaiveDate,
  pub bank_account_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
  Income,
  Expense,
  Transfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub title: String,
  #[serde(rename = "type")]
  pub category_type: CategoryType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub color: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
  Income,
  Expense,
}

/// Recurring payment (streaming, rent, insurance...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub title: String,
  pub amount: f64,
  #[serde(default = "default_currency")]
  pub currency: String,
  pub interval: BillingInterval,
  pub next_payment_date: NaiveDate,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bank_account_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category_id: Option<String>,
  #[serde(default = "default_true")]
  pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingInterval {
  Weekly,
  Monthly,
  Quarterly,
  Yearly,
}

/// CSV statement upload and its processing state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Import {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub file_name: String,
  pub status: ImportStatus,
  pub bank_account_id: String,
  #[serde(default)]
  pub imported_count: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
  Pending,
  Processing,
  Completed,
  Failed,
}

impl ImportStatus {
  pub fn is_finished(self) -> bool {
    matches!(self, ImportStatus::Completed | ImportStatus::Failed)
  }
}

/// Saved dashboard arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub name: String,
  #[serde(default)]
  pub widgets: Vec<WidgetPlacement>,
}

/// Grid position of one dashboard widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPlacement {
  pub widget_id: String,
  pub kind: String,
  pub x: u32,
  pub y: u32,
  pub w: u32,
  pub h: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthSnapshot {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub date: NaiveDate,
  pub assets: f64,
  pub liabilities: f64,
  pub net_worth: f64,
}

fn default_currency() -> String {
  "EUR".to_string()
}

fn default_true() -> bool {
  true
}
