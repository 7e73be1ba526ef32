use rusqlite::Statement;
use rusqlite::types::Value as SqlValue;
use serde_json::{Value, json};

/// Runs a prepared statement and maps every row to a JSON object keyed by
/// column name. Column order is preserved within each object; values are
/// whatever the database returns, so callers get dynamically typed scalars.
pub fn rows_to_json(stmt: &mut Statement) -> rusqlite::Result<Vec<Value>> {
    let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = serde_json::Map::new();
        for (index, name) in column_names.iter().enumerate() {
            let value: SqlValue = row.get(index)?;
            record.insert(name.clone(), json_from_sql(value));
        }
        out.push(Value::Object(record));
    }

    Ok(out)
}

fn json_from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => json!(v),
        SqlValue::Real(v) => json!(v),
        SqlValue::Text(v) => json!(v),
        SqlValue::Blob(v) => json!(encode_blob_hex(&v)),
    }
}

fn encode_blob_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{:02x}", b);
        out
    })
}
