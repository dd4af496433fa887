//! Filter to URL query string encoding.
//!
//! Filters are plain `Serialize` structs. The encoder walks their JSON form:
//! - `null` fields are dropped
//! - scalars become `key=value`
//! - arrays become repeated `key[]=value`
//! - one level of nesting becomes `key[sub]=value`
//!
//! Anything nested deeper is written as compact JSON under the one-level key.

use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded::byte_serialize;

use crate::error::{Result, SyncError};

/// Encode a filter into a query string (without the leading `?`).
///
/// A filter serializing to `null` (e.g. `None`) encodes to the empty string.
pub fn encode<F: Serialize + ?Sized>(filter: &F) -> Result<String> {
  let value = serde_json::to_value(filter).map_err(|e| SyncError::Encode(e.to_string()))?;

  match value {
    Value::Null => Ok(String::new()),
    Value::Object(map) => Ok(encode_object(&map)),
    other => Err(SyncError::Encode(format!(
      "expected an object, got {}",
      kind(&other)
    ))),
  }
}

/// Encode an already materialized JSON object.
pub fn encode_object(map: &Map<String, Value>) -> String {
  let mut pairs = Vec::new();

  for (key, value) in map {
    let key = escape(key);
    match value {
      Value::Null => {}
      Value::Array(items) => push_array(&mut pairs, &key, items),
      Value::Object(fields) => {
        for (sub, sub_value) in fields {
          let nested_key = format!("{}[{}]", key, escape(sub));
          match sub_value {
            Value::Array(items) => push_array(&mut pairs, &nested_key, items),
            other => {
              if let Some(rendered) = render(other) {
                pairs.push(format!("{}={}", nested_key, escape(&rendered)));
              }
            }
          }
        }
      }
      other => {
        if let Some(rendered) = render(other) {
          pairs.push(format!("{}={}", key, escape(&rendered)));
        }
      }
    }
  }

  pairs.join("&")
}

fn push_array(pairs: &mut Vec<String>, key: &str, items: &[Value]) {
  for item in items {
    if let Some(rendered) = render(item) {
      pairs.push(format!("{}[]={}", key, escape(&rendered)));
    }
  }
}

/// Render a leaf value. Strings are taken raw (no JSON quotes).
fn render(value: &Value) -> Option<String> {
  match value {
    Value::Null => None,
    Value::String(s) => Some(s.clone()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    nested => Some(nested.to_string()),
  }
}

fn escape(raw: &str) -> String {
  byte_serialize(raw.as_bytes()).collect()
}

fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  /// Minimal bracket-aware decoder, enough to check what a server-side
  /// query parser would reconstruct.
  fn decode(query: &str) -> Value {
    let mut root = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
      let value = Value::String(value.into_owned());
      if let Some(base) = key.strip_suffix("[]") {
        if let Some((outer, inner)) = split_nested(base) {
          let entry = root
            .entry(outer)
            .or_insert_with(|| Value::Object(Map::new()));
          let list = entry
            .as_object_mut()
            .unwrap()
            .entry(inner)
            .or_insert_with(|| Value::Array(Vec::new()));
          list.as_array_mut().unwrap().push(value);
        } else {
          let list = root
            .entry(base.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
          list.as_array_mut().unwrap().push(value);
        }
      } else if let Some((outer, inner)) = split_nested(&key) {
        let entry = root
          .entry(outer)
          .or_insert_with(|| Value::Object(Map::new()));
        entry.as_object_mut().unwrap().insert(inner, value);
      } else {
        root.insert(key.into_owned(), value);
      }
    }
    Value::Object(root)
  }

  fn split_nested(key: &str) -> Option<(String, String)> {
    let open = key.find('[')?;
    let inner = key[open + 1..].strip_suffix(']')?;
    Some((key[..open].to_string(), inner.to_string()))
  }

  #[test]
  fn test_round_trip_through_query_parser() {
    let filter = json!({ "a": 1, "b": { "x": "y" }, "c": [1, 2] });
    let query = encode(&filter).unwrap();

    assert_eq!(query, "a=1&b[x]=y&c[]=1&c[]=2");
    assert_eq!(
      decode(&query),
      json!({ "a": "1", "b": { "x": "y" }, "c": ["1", "2"] })
    );
  }

  #[test]
  fn test_null_fields_are_omitted() {
    let filter = json!({ "title": null, "skip": 0, "range": { "from": null, "to": "2024-02-01" } });
    assert_eq!(encode(&filter).unwrap(), "skip=0&range[to]=2024-02-01");
  }

  #[test]
  fn test_struct_field_order_is_preserved() {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Filter {
      take: Option<u32>,
      sort_by: Option<&'static str>,
      bank_account_id: Option<&'static str>,
    }

    let filter = Filter {
      take: Some(20),
      sort_by: Some("createdAt"),
      bank_account_id: None,
    };
    assert_eq!(encode(&filter).unwrap(), "take=20&sortBy=createdAt");
  }

  #[test]
  fn test_values_are_percent_encoded() {
    let filter = json!({ "title": "Rent & utilities", "tags": ["a/b"] });
    assert_eq!(
      encode(&filter).unwrap(),
      "title=Rent+%26+utilities&tags[]=a%2Fb"
    );
  }

  #[test]
  fn test_array_order_is_preserved_and_nulls_skipped() {
    let filter = json!({ "ids": ["c", null, "a", "b"] });
    assert_eq!(encode(&filter).unwrap(), "ids[]=c&ids[]=a&ids[]=b");
  }

  #[test]
  fn test_deeper_nesting_falls_back_to_json() {
    let filter = json!({ "outer": { "inner": { "deep": 1 } } });
    let query = encode(&filter).unwrap();
    let decoded = decode(&query);
    assert_eq!(decoded["outer"]["inner"], json!("{\"deep\":1}"));
  }

  #[test]
  fn test_none_filter_is_empty() {
    let filter: Option<Value> = None;
    assert_eq!(encode(&filter).unwrap(), "");
  }

  #[test]
  fn test_non_object_filter_is_rejected() {
    let err = encode(&42).unwrap_err();
    assert!(matches!(err, SyncError::Encode(_)));
  }
}
