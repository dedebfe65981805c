//! Flattening of nested JSON columns into prefixed top-level columns.
//!
//! A column whose cells are mappings is replaced by one column per subkey,
//! named `{field}_{subkey}`. The subkey set is the union observed across all
//! rows being flattened together; rows lacking the field, or holding a
//! non-mapping value there, contribute nulls for every known subkey. The
//! operation is pure and composable: callers may flatten several fields in
//! sequence.

use serde_json::Value;

use crate::{error::GatherError, table::Table};

/// Flattens the named fields of `table`, one after the other.
///
/// The input table is left untouched. A field whose column holds no mapping
/// in any row has nothing to promote and is kept as-is, which makes
/// flattening a no-op on already-flat columns.
pub fn unravel(table: &Table, fields: &[&str]) -> Result<Table, GatherError> {
    let mut out = table.clone();
    for field in fields {
        out = unravel_field(&out, field)?;
    }
    Ok(out)
}

/// Convenience: builds a table from raw records and flattens in one step.
pub fn flatten_records(records: &[Value], fields: &[&str]) -> Result<Table, GatherError> {
    unravel(&Table::from_records(records), fields)
}

fn unravel_field(table: &Table, field: &str) -> Result<Table, GatherError> {
    let field_idx = table
        .column_index(field)
        .ok_or_else(|| GatherError::MissingColumn {
            column: field.to_string(),
        })?;

    // union of subkeys across all rows, in first-seen order
    let mut subkeys: Vec<String> = Vec::new();
    for row in table.rows() {
        if let Value::Object(map) = &row[field_idx] {
            for key in map.keys() {
                if !subkeys.iter().any(|k| k == key) {
                    subkeys.push(key.clone());
                }
            }
        }
    }

    if subkeys.is_empty() {
        return Ok(table.clone());
    }

    let mut columns: Vec<String> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != field_idx)
        .map(|(_, c)| c.clone())
        .collect();
    columns.extend(subkeys.iter().map(|k| format!("{field}_{k}")));

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let mut out: Vec<Value> = row
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != field_idx)
                .map(|(_, v)| v.clone())
                .collect();
            match &row[field_idx] {
                Value::Object(map) => {
                    out.extend(
                        subkeys
                            .iter()
                            .map(|k| map.get(k).cloned().unwrap_or(Value::Null)),
                    );
                }
                _ => out.extend(std::iter::repeat_n(Value::Null, subkeys.len())),
            }
            out
        })
        .collect();

    Ok(Table::from_parts(columns, rows))
}
