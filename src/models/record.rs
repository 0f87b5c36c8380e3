use serde_json::{Map, Value};

/// Untyped source data for one model instance
pub type RawRecord = Map<String, Value>;

/// One element of hydrate input: either a raw row or an instance that is
/// already hydrated and passes through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Row<M> {
    Raw(RawRecord),
    Hydrated(M),
}

impl<M> Row<M> {
    pub fn is_hydrated(&self) -> bool {
        matches!(self, Row::Hydrated(_))
    }
}

impl<M> From<RawRecord> for Row<M> {
    fn from(record: RawRecord) -> Self {
        Row::Raw(record)
    }
}

/// Key-order independent rendering of a record, used as its default identity
pub(crate) fn canonical_identity(record: &RawRecord) -> String {
    let mut identity = String::new();
    push_canonical_object(record, &mut identity);
    identity
}

fn push_canonical_object(map: &Map<String, Value>, out: &mut String) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (index, (key, value)) in entries.into_iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&Value::String(key.clone()).to_string());
        out.push(':');
        push_canonical(value, out);
    }
    out.push('}');
}

fn push_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => push_canonical_object(map, out),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                push_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
