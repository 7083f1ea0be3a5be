use crate::enums::LogicalQuery;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ==============================================================================
// Request side
// ==============================================================================

/// A raw parameter value as received on the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    /// A key that appeared more than once.
    Many(Vec<String>),
}

impl ParamValue {
    /// The first supplied value, which is what scalar parameters use.
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::Many(values) => values.first().map(String::as_str),
        }
    }

    /// Every supplied value, in the order received.
    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::Single(value) => vec![value.as_str()],
            ParamValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// An empty list carries no value and counts as absent.
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Many(values) if values.is_empty())
    }
}

/// The parameters of one request, in the order the keys first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    entries: Vec<(String, ParamValue)>,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the parameter set from decoded key/value pairs. A key seen more
    /// than once collects all of its values into a list.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.push(key, value);
        }
        params
    }

    /// Appends one value for `key`, promoting an existing scalar to a list.
    ///
    /// The lookup scans distinct keys only, so repeating one key many times
    /// stays linear in the number of pairs.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => {
                let values = match std::mem::replace(existing, ParamValue::Many(Vec::new())) {
                    ParamValue::Single(first) => vec![first, value],
                    ParamValue::Many(mut values) => {
                        values.push(value);
                        values
                    }
                };
                *existing = ParamValue::Many(values);
            }
            None => self.entries.push((key, ParamValue::Single(value))),
        }
    }

    /// Sets `key` to an explicit list, replacing any earlier value.
    pub fn set_list(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, ParamValue::Many(values)));
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==============================================================================
// Validated query and built SQL
// ==============================================================================

/// Inclusive date window. Both ends are `YYYY-MM-DD` strings that passed the
/// syntactic date check; calendar validity is left to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// The output of validation. Every field the schema marks required is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    pub query: LogicalQuery,
    /// One entity for single-country queries, two or more for comparisons.
    pub entities: Vec<String>,
    pub date_range: DateRange,
    /// The metric or indicator name, already checked against its allow-list.
    pub metric: Option<String>,
    pub flags: BTreeMap<String, bool>,
}

impl ValidatedQuery {
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}

/// Query text with positional placeholders plus the values bound to them,
/// in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFragment {
    pub text: String,
    pub args: Vec<String>,
}

impl SqlFragment {
    pub fn new(text: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            text: text.into(),
            args,
        }
    }
}

// ==============================================================================
// Result side
// ==============================================================================

/// A single typed scalar as decoded from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Int(int) => serializer.serialize_i64(*int),
            Value::Float(float) => serializer.serialize_f64(*float),
            // JSON consumers want numbers; fall back to text for values outside f64.
            Value::Decimal(decimal) => match decimal.to_f64() {
                Some(float) => serializer.serialize_f64(float),
                None => serializer.serialize_str(&decimal.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Text(text) => f.write_str(text),
            Value::Int(int) => write!(f, "{}", int),
            Value::Float(float) => write!(f, "{}", float),
            Value::Decimal(decimal) => write!(f, "{}", decimal),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<i64> for Value {
    fn from(int: i64) -> Self {
        Value::Int(int)
    }
}

/// One row from the store, columns in projection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultRow(pub Vec<Value>);

impl ResultRow {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

/// All rows for one entity of a comparison query.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySeries {
    pub entity: String,
    pub rows: Vec<Vec<Value>>,
}

/// Either a flat sequence of rows or rows grouped per entity. Groups keep
/// first-seen order and serialize as a JSON object in that order.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapedResult {
    Flat(Vec<Vec<Value>>),
    Grouped(Vec<EntitySeries>),
}

impl ShapedResult {
    pub fn is_empty(&self) -> bool {
        match self {
            ShapedResult::Flat(rows) => rows.is_empty(),
            ShapedResult::Grouped(series) => series.is_empty(),
        }
    }
}

impl Serialize for ShapedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ShapedResult::Flat(rows) => {
                let mut seq = serializer.serialize_seq(Some(rows.len()))?;
                for row in rows {
                    seq.serialize_element(row)?;
                }
                seq.end()
            }
            ShapedResult::Grouped(series) => {
                let mut map = serializer.serialize_map(Some(series.len()))?;
                for group in series {
                    map.serialize_entry(&group.entity, &group.rows)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_collect_into_a_list() {
        let params = RequestParameters::from_pairs([
            ("countries", "Canada"),
            ("start", "2021-01-01"),
            ("countries", "Mexico"),
        ]);

        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["countries", "start"]);
        assert_eq!(
            params.get("countries").map(ParamValue::values),
            Some(vec!["Canada", "Mexico"])
        );
        assert_eq!(
            params.get("start").and_then(ParamValue::first),
            Some("2021-01-01")
        );
    }

    #[test]
    fn empty_list_counts_as_null() {
        let mut params = RequestParameters::new();
        params.set_list("countries", Vec::new());
        assert!(params.get("countries").is_some_and(ParamValue::is_null));
    }

    #[test]
    fn grouped_result_serializes_in_first_seen_order() {
        let shaped = ShapedResult::Grouped(vec![
            EntitySeries {
                entity: "Zambia".to_string(),
                rows: vec![vec![Value::from("2021-01-01"), Value::Int(3)]],
            },
            EntitySeries {
                entity: "Albania".to_string(),
                rows: vec![vec![Value::from("2021-01-01"), Value::Null]],
            },
        ]);

        let json = serde_json::to_string(&shaped).unwrap();
        assert_eq!(
            json,
            r#"{"Zambia":[["2021-01-01",3]],"Albania":[["2021-01-01",null]]}"#
        );
    }

    #[test]
    fn decimals_serialize_as_numbers() {
        let value = Value::Decimal(Decimal::new(1250, 2));
        assert_eq!(serde_json::to_string(&value).unwrap(), "12.5");
    }

    #[test]
    fn many_repeats_of_one_key_stay_one_entry() {
        let mut params = RequestParameters::new();
        for i in 0..1000 {
            params.push("countries", format!("Country {i}"));
        }

        assert_eq!(params.keys().count(), 1);
        let values = params.get("countries").map(ParamValue::values).unwrap();
        assert_eq!(values.len(), 1000);
        assert_eq!(values[0], "Country 0");
        assert_eq!(values[999], "Country 999");
    }
}
