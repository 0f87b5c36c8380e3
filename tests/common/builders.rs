//! Raw row builders shared by the integration tests.

#![allow(dead_code)]

use row_hydrator::RawRecord;
use serde_json::{json, Value};

/// Unwrap a `json!({...})` literal into a record
pub fn record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// `[{integer: 0}, ..., {integer: count - 1}]`
pub fn integer_rows(count: i64) -> Vec<RawRecord> {
    (0..count)
        .map(|integer| record(json!({ "integer": integer })))
        .collect()
}

pub fn author_row(id: i64) -> RawRecord {
    let name = match id {
        1 => "Ursula",
        2 => "Octavia",
        _ => "Anonymous",
    };
    record(json!({ "id": id, "name": name }))
}

/// Books table: two books per known author
pub fn book_rows_for(author_id: i64) -> Vec<RawRecord> {
    match author_id {
        1 => vec![
            record(json!({ "id": 10, "title": "The Dispossessed", "author_id": 1 })),
            record(json!({ "id": 11, "title": "The Lathe of Heaven", "author_id": 1 })),
        ],
        2 => vec![
            record(json!({ "id": 20, "title": "Kindred", "author_id": 2 })),
            record(json!({ "id": 21, "title": "Dawn", "author_id": 2 })),
        ],
        _ => Vec::new(),
    }
}

/// The same two tag rows for every post
pub fn tag_rows() -> Vec<RawRecord> {
    vec![
        record(json!({ "name": "rust" })),
        record(json!({ "name": "async" })),
    ]
}

pub fn post_rows(count: i64) -> Vec<RawRecord> {
    (1..=count).map(|id| record(json!({ "id": id }))).collect()
}
