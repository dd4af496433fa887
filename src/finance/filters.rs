//! Read filters. `None` fields never reach the query string.
//!
//! Filters also deserialize from the text values of command-line
//! `key=value` pairs, so numbers and flags accept either form.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};

use super::types::{AccountType, BillingInterval, CategoryType, ImportStatus, TransactionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  Desc,
}

/// Pagination and sorting shared by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub skip: Option<u32>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub take: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sort_by: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sort_order: Option<SortOrder>,
}

impl Page {
  pub fn new(skip: u32, take: u32) -> Self {
    Self {
      skip: Some(skip),
      take: Some(take),
      ..Self::default()
    }
  }

  pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
    self.sort_by = Some(field.into());
    self.sort_order = Some(order);
    self
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub from: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountFilter {
  #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
  pub account_type: Option<AccountType>,
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub archived: Option<bool>,
  #[serde(flatten)]
  pub page: Page,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bank_account_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category_id: Option<String>,
  #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
  pub transaction_type: Option<TransactionType>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date_range: Option<DateRange>,
  #[serde(flatten)]
  pub page: Page,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFilter {
  #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
  pub category_type: Option<CategoryType>,
  #[serde(flatten)]
  pub page: Page,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFilter {
  #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
  pub active: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub interval: Option<BillingInterval>,
  #[serde(flatten)]
  pub page: Page,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFilter {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bank_account_id: Option<String>,
  #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
  pub status: Vec<ImportStatus>,
  #[serde(flatten)]
  pub page: Page,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthFilter {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date_range: Option<DateRange>,
  #[serde(flatten)]
  pub page: Page,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + FromStr,
  T::Err: fmt::Display,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Loose<T> {
    Typed(T),
    Text(String),
  }

  match Option::<Loose<T>>::deserialize(deserializer)? {
    None => Ok(None),
    Some(Loose::Typed(value)) => Ok(Some(value)),
    Some(Loose::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
  }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
  }

  Ok(match OneOrMany::deserialize(deserializer)? {
    OneOrMany::Many(items) => items,
    OneOrMany::One(item) => vec![item],
  })
}
