//! Wire types for the document REST API.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

static NULL_VALUE: JsonValue = JsonValue::Null;

/// One record as returned by `GET /tables/{table}/records`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    #[serde(default)]
    pub fields: Map<String, JsonValue>,
}

impl StoredRecord {
    /// Field value by stored column name, `Null` when absent.
    pub fn field(&self, name: &str) -> &JsonValue {
        self.fields.get(name).unwrap_or(&NULL_VALUE)
    }
}

/// Envelope of `GET /tables/{table}/records`.
#[derive(Debug, Deserialize)]
pub struct RecordsResponse {
    pub records: Vec<StoredRecord>,
}

/// Envelope of `POST /tables/{table}/records` (created ids echo back).
#[derive(Debug, Deserialize)]
pub struct CreatedResponse {
    pub records: Vec<CreatedRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedRecord {
    pub id: i64,
}

/// Envelope of `GET /tables/{table}/columns`.
#[derive(Debug, Deserialize)]
pub struct ColumnsResponse {
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ColumnInfo {
    pub id: String,
}
