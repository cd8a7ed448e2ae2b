use bitvec::prelude::*;

use crate::error::DbResult;
use crate::storage::Storage;
use crate::table::Table;
use crate::value::Value;

/// Column-oriented SELECT output: each requested column with its values, in
/// the order the columns were requested and rows were inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    columns: Vec<(String, Vec<Value>)>,
}

impl Projection {
    /// Values of `column`, or `None` if it was not requested.
    pub fn get(&self, column: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, values)| values.as_slice())
    }

    /// Requested column names, in request order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |(_, values)| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Iterates over `(column, values)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Pivots into row-oriented data: the column names and one vector per row.
    pub fn into_rows(self) -> (Vec<String>, Vec<Vec<Value>>) {
        let row_count = self.row_count();
        let mut rows: Vec<Vec<Value>> = (0..row_count)
            .map(|_| Vec::with_capacity(self.columns.len()))
            .collect();
        let mut names = Vec::with_capacity(self.columns.len());

        for (name, values) in self.columns {
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
            names.push(name);
        }
        (names, rows)
    }
}

pub struct SelectQuery<'a> {
    storage: &'a Storage,
}

impl<'a> SelectQuery<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The whole table, every column of every row.
    pub fn select_all(&self, table: &str) -> DbResult<&'a Table> {
        self.storage.get_table_const(table)
    }

    /// Projects `columns` over every row.
    ///
    /// `["*"]` expands to every table column. Every column is resolved before
    /// any value is copied, so an unknown column yields
    /// [DbError::ColumnNotFound](crate::DbError::ColumnNotFound) and nothing else.
    pub fn select_columns(&self, table: &str, columns: &[String]) -> DbResult<Projection> {
        let table = self.storage.get_table_const(table)?;
        project(table, columns, None)
    }

    /// Projects `columns` over the rows whose `condition_column` equals `value`.
    ///
    /// Equality is [Value] equality: kind and payload must both match. No
    /// matching row gives one empty vector per requested column.
    ///
    /// # Example
    /// ```
    /// use simpledb::{MemoryBackend, Storage, Value};
    /// use simpledb::queries::SelectQuery;
    ///
    /// let mut storage = Storage::with_backend("db", Box::new(MemoryBackend::new())).unwrap();
    /// storage.create_table("users", vec!["name".into(), "admin".into()], None).unwrap();
    /// let users = storage.get_table("users").unwrap();
    /// users.insert_row(vec![Value::from("Alice"), Value::Bool(true)]).unwrap();
    /// users.insert_row(vec![Value::from("Bob"), Value::Bool(false)]).unwrap();
    ///
    /// let result = SelectQuery::new(&storage)
    ///     .select_where("users", &["name".to_string()], &Value::Bool(true), "admin")
    ///     .unwrap();
    /// assert_eq!(result.get("name").unwrap(), [Value::from("Alice")]);
    /// ```
    pub fn select_where(
        &self,
        table: &str,
        columns: &[String],
        value: &Value,
        condition_column: &str,
    ) -> DbResult<Projection> {
        let table = self.storage.get_table_const(table)?;
        let condition_idx = table.column_index(condition_column)?;

        let matches: BitVec = table.rows().map(|row| row[condition_idx] == *value).collect();
        project(table, columns, Some(matches.as_bitslice()))
    }
}

/// Copies the requested columns of the selected rows (all rows when `mask` is
/// `None`).
fn project(table: &Table, columns: &[String], mask: Option<&BitSlice>) -> DbResult<Projection> {
    let expanded;
    let columns = if columns.len() == 1 && columns[0] == "*" {
        expanded = table.column_names().to_vec();
        expanded.as_slice()
    } else {
        columns
    };

    let indexes = columns
        .iter()
        .map(|column| table.column_index(column))
        .collect::<DbResult<Vec<usize>>>()?;

    let selected: Vec<&[Value]> = match mask {
        Some(mask) => mask
            .iter_ones()
            .filter_map(|row_idx| table.get_row(row_idx).ok())
            .collect(),
        None => table.rows().collect(),
    };

    let columns = columns
        .iter()
        .zip(indexes)
        .map(|(name, idx)| {
            let values = selected.iter().map(|row| row[idx].clone()).collect();
            (name.clone(), values)
        })
        .collect();

    Ok(Projection { columns })
}
