//! Resource names the CLI accepts, argument parsing and autocomplete logic

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
  Accounts,
  Transactions,
  Categories,
  Subscriptions,
  Imports,
  DashboardLayouts,
  NetWorth,
}

#[derive(Debug, Clone)]
pub struct Resource {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub kind: ResourceKind,
}

/// All available resources
pub const RESOURCES: &[Resource] = &[
  Resource {
    name: "accounts",
    aliases: &["a", "account", "bank-accounts", "bank-account"],
    description: "Bank accounts, cards and wallets",
    kind: ResourceKind::Accounts,
  },
  Resource {
    name: "transactions",
    aliases: &["t", "tx", "transaction"],
    description: "Income, expenses and transfers",
    kind: ResourceKind::Transactions,
  },
  Resource {
    name: "categories",
    aliases: &["c", "cat", "category"],
    description: "Transaction categories",
    kind: ResourceKind::Categories,
  },
  Resource {
    name: "subscriptions",
    aliases: &["s", "sub", "subscription"],
    description: "Recurring payments",
    kind: ResourceKind::Subscriptions,
  },
  Resource {
    name: "imports",
    aliases: &["i", "import"],
    description: "CSV statement imports",
    kind: ResourceKind::Imports,
  },
  Resource {
    name: "layouts",
    aliases: &["l", "layout", "dashboard", "dashboard-layouts"],
    description: "Saved dashboard layouts",
    kind: ResourceKind::DashboardLayouts,
  },
  Resource {
    name: "net-worth",
    aliases: &["n", "nw", "snapshots"],
    description: "Net-worth snapshots",
    kind: ResourceKind::NetWorth,
  },
];

impl Resource {
  /// Every name the resource answers to, canonical name first.
  fn names(&self) -> impl Iterator<Item = &'static str> {
    let aliases: &'static [&'static str] = self.aliases;
    std::iter::once(self.name).chain(aliases.iter().copied())
  }

  /// Best match rank for `input` (lower is better).
  ///
  /// Exact beats prefix beats substring; within a tier the canonical name
  /// beats an alias.
  fn rank(&self, input: &str) -> Option<u32> {
    self
      .names()
      .enumerate()
      .filter_map(|(i, candidate)| {
        let tier = if candidate == input {
          0
        } else if candidate.starts_with(input) {
          1
        } else if candidate.contains(input) {
          2
        } else {
          return None;
        };
        Some(tier * 2 + u32::from(i > 0))
      })
      .min()
  }
}

/// Resources matching `input`, best match first. Empty input lists all.
pub fn get_suggestions(input: &str) -> Vec<&'static Resource> {
  let input = input.to_lowercase();
  if input.is_empty() {
    return RESOURCES.iter().collect();
  }

  let mut ranked: Vec<(&'static Resource, u32)> = RESOURCES
    .iter()
    .filter_map(|res| res.rank(&input).map(|rank| (res, rank)))
    .collect();
  ranked.sort_by_key(|(_, rank)| *rank);
  ranked.into_iter().map(|(res, _)| res).collect()
}

/// Resolve user input to a resource, taking the best suggestion.
pub fn resolve(input: &str) -> Option<&'static Resource> {
  if input.trim().is_empty() {
    return None;
  }
  get_suggestions(input.trim()).into_iter().next()
}

/// Build a filter object from `key=value` arguments.
///
/// `outer.inner=value` nests one level (`dateRange.from=2024-01-01`) and a
/// repeated key collects its values into an array.
pub fn parse_filter(pairs: &[String]) -> Result<Map<String, Value>> {
  let mut filter = Map::new();

  for pair in pairs {
    let (key, value) = pair
      .split_once('=')
      .ok_or_else(|| SyncError::Validation(format!("filter '{}' is not KEY=VALUE", pair)))?;
    let key = key.trim();
    if key.is_empty() {
      return Err(SyncError::Validation(format!("filter '{}' has no key", pair)));
    }
    let value = Value::String(value.to_string());

    match key.split_once('.') {
      Some((outer, inner)) => {
        let nested = filter
          .entry(outer)
          .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(nested) = nested else {
          return Err(SyncError::Validation(format!(
            "filter key '{}' is used both as a value and an object",
            outer
          )));
        };
        insert_or_append(nested, inner, value);
      }
      None => {
        if matches!(filter.get(key), Some(Value::Object(_))) {
          return Err(SyncError::Validation(format!(
            "filter key '{}' is used both as a value and an object",
            key
          )));
        }
        insert_or_append(&mut filter, key, value);
      }
    }
  }

  Ok(filter)
}

/// Read parsed filter pairs into a resource's typed filter.
///
/// A key the filter type does not know is an error rather than being
/// dropped from the query.
pub fn typed_filter<F>(raw: Map<String, Value>) -> Result<F>
where
  F: DeserializeOwned + Serialize,
{
  let keys: Vec<String> = raw.keys().cloned().collect();
  let filter: F = serde_json::from_value(Value::Object(raw))
    .map_err(|e| SyncError::Validation(format!("invalid filter: {}", e)))?;

  let known = serde_json::to_value(&filter).map_err(|e| SyncError::Encode(e.to_string()))?;
  if let Some(unknown) = keys.iter().find(|key| known.get(key.as_str()).is_none()) {
    return Err(SyncError::Validation(format!(
      "unknown filter key '{}'",
      unknown
    )));
  }
  Ok(filter)
}

fn insert_or_append(map: &mut Map<String, Value>, key: &str, value: Value) {
  match map.get_mut(key) {
    Some(Value::Array(items)) => items.push(value),
    Some(existing) => {
      let first = existing.take();
      *existing = Value::Array(vec![first, value]);
    }
    None => {
      map.insert(key.to_string(), value);
    }
  }
}

/// Parse a `--data` argument into a JSON object payload.
pub fn parse_data(raw: &str) -> Result<Value> {
  let value: Value = serde_json::from_str(raw)
    .map_err(|e| SyncError::Validation(format!("--data is not valid JSON: {}", e)))?;
  if !value.is_object() {
    return Err(SyncError::Validation(
      "--data must be a JSON object".to_string(),
    ));
  }
  Ok(value)
}

/// MIME type for an uploaded file, from its extension.
pub fn mime_for(file_name: &str) -> Option<&'static str> {
  let ext = file_name.rsplit_once('.')?.1.to_lowercase();
  match ext.as_str() {
    "csv" => Some("text/csv"),
    "png" => Some("image/png"),
    "jpg" | "jpeg" => Some("image/jpeg"),
    "svg" => Some("image/svg+xml"),
    "webp" => Some("image/webp"),
    _ => None,
  }
}
