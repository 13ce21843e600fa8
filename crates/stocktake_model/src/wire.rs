//! Normalization helpers for the inventory backend's JSON.
//!
//! The backend is loose about shapes: list endpoints wrap rows in an
//! envelope, nested objects come back as `null` instead of being omitted,
//! and timestamps are either plain strings or `{ "datetime" | "date", "formatted" }`
//! objects. Everything here folds those variants into plain `Option<String>`
//! fields so the rest of the workspace never sees raw payloads.

use serde::{Deserialize, Deserializer, Serialize};

/// List envelope returned by collection endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub rows: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            total: rows.len() as u64,
            rows,
        }
    }

    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Plain(String),
    Formatted {
        #[serde(default)]
        formatted: Option<String>,
        #[serde(default)]
        datetime: Option<String>,
        #[serde(default)]
        date: Option<String>,
    },
}

/// Accepts `null`, a plain string, or a formatted date object.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawDate>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        RawDate::Plain(s) => non_empty(s),
        RawDate::Formatted {
            formatted,
            datetime,
            date,
        } => formatted.or(datetime).or(date).and_then(non_empty),
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Accepts `null`, a string, or a number (purchase costs arrive as either).
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawText>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        RawText::Text(s) => non_empty(s),
        RawText::Integer(n) => Some(n.to_string()),
        RawText::Float(f) => Some(f.to_string()),
    }))
}

/// Treats `null` the same as an empty list.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treats `null` as the type's default (asset names may be `null`).
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_date")]
        at: Option<String>,
        #[serde(default, deserialize_with = "lenient_text")]
        cost: Option<String>,
    }

    #[test]
    fn test_formatted_date_object() {
        let probe: Probe = serde_json::from_str(
            r#"{"at": {"datetime": "2024-01-02 10:00:00", "formatted": "Tue Jan 02, 2024 10:00AM"}}"#,
        )
        .unwrap();
        assert_eq!(probe.at.as_deref(), Some("Tue Jan 02, 2024 10:00AM"));
    }

    #[test]
    fn test_date_object_without_formatted() {
        let probe: Probe = serde_json::from_str(r#"{"at": {"date": "2024-01-02"}}"#).unwrap();
        assert_eq!(probe.at.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_null_and_missing_fields() {
        let probe: Probe = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert!(probe.at.is_none());
        assert!(probe.cost.is_none());
    }

    #[test]
    fn test_numeric_cost() {
        let probe: Probe = serde_json::from_str(r#"{"cost": 1299.5}"#).unwrap();
        assert_eq!(probe.cost.as_deref(), Some("1299.5"));

        let probe: Probe = serde_json::from_str(r#"{"cost": "1,299.50"}"#).unwrap();
        assert_eq!(probe.cost.as_deref(), Some("1,299.50"));
    }

    #[test]
    fn test_page_with_null_rows() {
        let page: Page<u32> = serde_json::from_str(r#"{"total": 0, "rows": null}"#).unwrap();
        assert!(page.rows.is_empty());
    }
}
