//! In-memory tabular structure: ordered named columns over rows of JSON
//! values.
//!
//! This is the shape every component of the engine consumes and produces.
//! Cells are [`serde_json::Value`], so a column can hold nulls, scalars,
//! lists, or nested mappings; the flattener promotes the nested ones into
//! their own columns. Joins take an explicit [`Suffixes`] rule for
//! overlapping column names, validated at join time.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use serde_json::Value;

use crate::error::GatherError;

/// Which rows survive a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Every left row survives; unmatched rows get nulls on the right side.
    Left,
    /// Only left rows with a matching right row survive.
    Inner,
}

/// Disambiguation rule for column names present on both sides of a join.
#[derive(Debug, Clone)]
pub struct Suffixes {
    pub left: String,
    pub right: String,
}

impl Suffixes {
    pub fn new(left: &str, right: &str) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

/// Rows × named columns. Column order is stable; every row has exactly one
/// cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// An explicitly empty table: zero columns, zero rows. Used as the
    /// neutral element of [`Table::concat`] so downstream joins stay total.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from columns and rows. Every row must match the
    /// column count.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        for row in &rows {
            assert_eq!(row.len(), columns.len(), "row width != column count");
        }
        Self { columns, rows }
    }

    /// Builds a table from raw JSON records.
    ///
    /// The column set is the union of keys across all object records, in
    /// first-seen order. Keys a record lacks surface as nulls; records that
    /// are not objects contribute a row of nulls.
    pub fn from_records(records: &[Value]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            if let Value::Object(map) = record {
                for key in map.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| match record {
                        Value::Object(map) => map.get(col).cloned().unwrap_or(Value::Null),
                        _ => Value::Null,
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>, GatherError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| GatherError::MissingColumn {
                column: name.to_string(),
            })?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// A new table keeping only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Table, GatherError> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| GatherError::MissingColumn {
                        column: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let columns = names.iter().map(|n| n.to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Table { columns, rows })
    }

    /// Appends a constant column, e.g. the owning collection id on every row.
    pub fn tag(&mut self, column: &str, value: Value) {
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }

    /// Renames a column in place.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), GatherError> {
        let idx = self
            .column_index(from)
            .ok_or_else(|| GatherError::MissingColumn {
                column: from.to_string(),
            })?;
        self.columns[idx] = to.to_string();
        Ok(())
    }

    /// A new table without the rows whose cell in `column` is null.
    pub fn drop_null_rows(&self, column: &str) -> Result<Table, GatherError> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| GatherError::MissingColumn {
                column: column.to_string(),
            })?;
        Ok(Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| !row[idx].is_null())
                .cloned()
                .collect(),
        })
    }

    /// Appends another table's rows, aligning on the union of both column
    /// sets. Cells for columns one side lacks are filled with nulls.
    /// Concatenating an explicitly empty table is a no-op.
    pub fn concat(&mut self, other: Table) {
        if other.columns.is_empty() {
            return;
        }
        if self.columns.is_empty() {
            *self = other;
            return;
        }

        for col in &other.columns {
            if self.column_index(col).is_none() {
                self.columns.push(col.clone());
                for row in &mut self.rows {
                    row.push(Value::Null);
                }
            }
        }

        let width = self.columns.len();
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();
        for row in other.rows {
            let mut aligned = vec![Value::Null; width];
            for (src, value) in row.into_iter().enumerate() {
                aligned[mapping[src]] = value;
            }
            self.rows.push(aligned);
        }
    }

    /// Left join: every row of `self` survives, matched against the first
    /// right row with an equal key.
    pub fn left_join(
        &self,
        other: &Table,
        left_on: &str,
        right_on: &str,
        suffixes: &Suffixes,
    ) -> Result<Table, GatherError> {
        self.join(other, left_on, right_on, suffixes, JoinKind::Left)
    }

    /// Inner join: only rows of `self` with a match in `other` survive.
    pub fn inner_join(
        &self,
        other: &Table,
        left_on: &str,
        right_on: &str,
        suffixes: &Suffixes,
    ) -> Result<Table, GatherError> {
        self.join(other, left_on, right_on, suffixes, JoinKind::Inner)
    }

    /// Joins `other` onto `self` by equality of the two key columns.
    ///
    /// The right side is expected to be unique per key (many-to-one); when it
    /// is not, the first matching row wins so left rows are never duplicated.
    /// Column names present on both sides are renamed with the suffix rule,
    /// which is validated: if the suffixed names still collide the join is
    /// rejected. Joining against a table with no columns at all degrades to
    /// the identity (left) or an empty result (inner) instead of erroring,
    /// which keeps the partial-result policy total.
    pub fn join(
        &self,
        other: &Table,
        left_on: &str,
        right_on: &str,
        suffixes: &Suffixes,
        kind: JoinKind,
    ) -> Result<Table, GatherError> {
        if other.columns.is_empty() {
            return Ok(match kind {
                JoinKind::Left => self.clone(),
                JoinKind::Inner => Table {
                    columns: self.columns.clone(),
                    rows: Vec::new(),
                },
            });
        }

        let left_idx = self
            .column_index(left_on)
            .ok_or_else(|| GatherError::MissingColumn {
                column: left_on.to_string(),
            })?;
        let right_idx = other
            .column_index(right_on)
            .ok_or_else(|| GatherError::MissingColumn {
                column: right_on.to_string(),
            })?;

        let overlap: HashSet<&String> = self
            .columns
            .iter()
            .filter(|c| other.column_index(c).is_some())
            .collect();

        let mut out_columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if overlap.contains(c) {
                    format!("{c}{}", suffixes.left)
                } else {
                    c.clone()
                }
            })
            .collect();
        out_columns.extend(other.columns.iter().map(|c| {
            if overlap.contains(c) {
                format!("{c}{}", suffixes.right)
            } else {
                c.clone()
            }
        }));

        let mut seen = HashSet::new();
        for name in &out_columns {
            if !seen.insert(name) {
                return Err(GatherError::Join(format!(
                    "column `{name}` is still ambiguous after applying suffixes `{}`/`{}`",
                    suffixes.left, suffixes.right
                )));
            }
        }

        let mut right_by_key: HashMap<String, usize> = HashMap::new();
        for (i, row) in other.rows.iter().enumerate() {
            if let Some(key) = join_key(&row[right_idx]) {
                right_by_key.entry(key).or_insert(i);
            }
        }

        let right_width = other.columns.len();
        let mut rows = Vec::new();
        for row in &self.rows {
            let matched = join_key(&row[left_idx]).and_then(|k| right_by_key.get(&k).copied());
            match (matched, kind) {
                (Some(i), _) => {
                    let mut out = row.clone();
                    out.extend(other.rows[i].iter().cloned());
                    rows.push(out);
                }
                (None, JoinKind::Left) => {
                    let mut out = row.clone();
                    out.extend(std::iter::repeat_n(Value::Null, right_width));
                    rows.push(out);
                }
                (None, JoinKind::Inner) => {}
            }
        }

        Ok(Table {
            columns: out_columns,
            rows,
        })
    }

    /// Writes the table as CSV: a header row of column names, then one
    /// record per row. Nulls become empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), GatherError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| cell_display(v)))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Plain-text form of a cell: strings unquoted, nulls empty, everything
/// else in its JSON rendering.
pub fn cell_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Join key of a cell. Null cells never match anything.
fn join_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
