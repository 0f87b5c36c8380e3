//! # Input and Output Shapes
//!
//! Hydrate input is a tagged [`RowInput`]: a single row, a sequence of rows, or
//! a numerically-keyed collection of rows. [`Hydrated`] mirrors it on the way
//! out. [`RowInput::classify`] is the heuristic used at untyped boundaries
//! where the input arrives as plain JSON.

use crate::error::{HydrationError, Result};
use crate::models::{RawRecord, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Single,
    Sequence,
    Keyed,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Single => write!(f, "single"),
            Shape::Sequence => write!(f, "sequence"),
            Shape::Keyed => write!(f, "keyed"),
        }
    }
}

/// Key of a keyed collection.
///
/// Integer keys order numerically and come before every other key; the rest
/// order lexically. `"2"` therefore sorts before `"10"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Ord for RowKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_integer(), other.as_integer()) {
            (Some(left), Some(right)) => left.cmp(&right).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for RowKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RowKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for RowKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<usize> for RowKey {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowInput<M> {
    Single(Row<M>),
    Sequence(Vec<Row<M>>),
    Keyed(BTreeMap<RowKey, Row<M>>),
}

impl<M> RowInput<M> {
    pub fn shape(&self) -> Shape {
        match self {
            RowInput::Single(_) => Shape::Single,
            RowInput::Sequence(_) => Shape::Sequence,
            RowInput::Keyed(_) => Shape::Keyed,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RowInput::Single(_) => 1,
            RowInput::Sequence(rows) => rows.len(),
            RowInput::Keyed(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Classify untyped JSON input.
    ///
    /// `null` yields `None`. Arrays are sequences. An object is a keyed
    /// collection when its first key is numeric, and a single record otherwise.
    /// The first key is the smallest array-index key (`"0"`, `"17"`, but not
    /// `"007"` or `"-1"`) when the object has one, and the first key in map
    /// order when it does not. Keyed collections with non-record members are
    /// rejected, as are scalars.
    ///
    /// Map order is insertion order, since serde_json is built with
    /// `preserve_order`.
    pub fn classify(value: Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => {
                let rows = items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| into_record(item, &index.to_string()).map(Row::Raw))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Some(RowInput::Sequence(rows)))
            }
            Value::Object(map) if is_numeric_map(&map) => {
                let rows = map
                    .into_iter()
                    .map(|(key, item)| -> Result<(RowKey, Row<M>)> {
                        let record = into_record(item, &key)?;
                        Ok((RowKey::from(key), Row::Raw(record)))
                    })
                    .collect::<Result<BTreeMap<_, _>>>()?;
                Ok(Some(RowInput::Keyed(rows)))
            }
            Value::Object(map) => Ok(Some(RowInput::Single(Row::Raw(map)))),
            other => Err(HydrationError::InvalidShape(format!(
                "expected null, a record, or a collection of records, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<M> From<RawRecord> for RowInput<M> {
    fn from(record: RawRecord) -> Self {
        RowInput::Single(Row::Raw(record))
    }
}

impl<M> From<Vec<RawRecord>> for RowInput<M> {
    fn from(records: Vec<RawRecord>) -> Self {
        RowInput::Sequence(records.into_iter().map(Row::Raw).collect())
    }
}

impl<M> From<BTreeMap<String, RawRecord>> for RowInput<M> {
    fn from(records: BTreeMap<String, RawRecord>) -> Self {
        RowInput::Keyed(
            records
                .into_iter()
                .map(|(key, record)| (RowKey::from(key), Row::Raw(record)))
                .collect(),
        )
    }
}

/// Hydrate output, mirroring the shape of the input
#[derive(Debug, Clone, PartialEq)]
pub enum Hydrated<M> {
    Single(M),
    Sequence(Vec<M>),
    Keyed(BTreeMap<RowKey, M>),
}

impl<M> Hydrated<M> {
    pub fn shape(&self) -> Shape {
        match self {
            Hydrated::Single(_) => Shape::Single,
            Hydrated::Sequence(_) => Shape::Sequence,
            Hydrated::Keyed(_) => Shape::Keyed,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Hydrated::Single(_) => 1,
            Hydrated::Sequence(models) => models.len(),
            Hydrated::Keyed(models) => models.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_single(self) -> Option<M> {
        match self {
            Hydrated::Single(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_sequence(self) -> Option<Vec<M>> {
        match self {
            Hydrated::Sequence(models) => Some(models),
            _ => None,
        }
    }

    pub fn into_keyed(self) -> Option<BTreeMap<RowKey, M>> {
        match self {
            Hydrated::Keyed(models) => Some(models),
            _ => None,
        }
    }

    /// Flatten any shape into a vector (keyed collections in key order)
    pub fn into_vec(self) -> Vec<M> {
        match self {
            Hydrated::Single(model) => vec![model],
            Hydrated::Sequence(models) => models,
            Hydrated::Keyed(models) => models.into_values().collect(),
        }
    }
}

fn is_numeric_map(map: &RawRecord) -> bool {
    first_key(map).is_some_and(is_numeric_key)
}

/// Array-index keys enumerate first, in ascending order; other keys follow in
/// map order
fn first_key(map: &RawRecord) -> Option<&str> {
    map.keys()
        .filter_map(|key| array_index(key).map(|index| (index, key)))
        .min_by_key(|(index, _)| *index)
        .or_else(|| map.keys().next().map(|key| (0, key)))
        .map(|(_, key)| key.as_str())
}

fn array_index(key: &str) -> Option<u32> {
    let index: u32 = key.parse().ok()?;
    (index != u32::MAX && index.to_string() == key).then_some(index)
}

/// Decimal numbers, signed or not, with surrounding whitespace allowed
fn is_numeric_key(key: &str) -> bool {
    let trimmed = key.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && trimmed.parse::<f64>().is_ok()
}

fn into_record(value: Value, position: &str) -> Result<RawRecord> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(HydrationError::InvalidShape(format!(
            "element {position} is {}, expected a record",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
