//! A model with no derived fields: the row's fields, kept as JSON.

use super::{Model, RawRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicModel {
    fields: RawRecord,
}

impl DynamicModel {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    pub fn fields(&self) -> &RawRecord {
        &self.fields
    }

    pub fn into_fields(self) -> RawRecord {
        self.fields
    }
}

impl Model for DynamicModel {
    const MODEL_NAME: &'static str = "DynamicModel";

    fn from_record(record: &RawRecord) -> crate::Result<Self> {
        Ok(Self {
            fields: record.clone(),
        })
    }
}
