use std::collections::HashMap;

use crate::data_type::DataType;
use crate::error::{DbError, DbResult};
use crate::value::Value;

/// Column definition as written in a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// `None` when the column was declared without a type.
    pub data_type: Option<DataType>,
}

/// A named table: an ordered column schema plus an append-only list of rows.
///
/// Every row has exactly one value per column. When column types are declared,
/// every value's [DataType] matches the type of its column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    column_types: Option<Vec<DataType>>,
    index_of: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table.
    ///
    /// # Errors
    /// Returns [DbError::SchemaError] if `column_types` does not have one entry
    /// per column, or if a column name is empty, contains whitespace or is
    /// repeated.
    ///
    /// # Example
    /// ```
    /// # use simpledb::{DataType, Table, Value};
    /// let mut table = Table::new(
    ///     "users",
    ///     vec!["id".into(), "name".into()],
    ///     Some(vec![DataType::Int, DataType::Str]),
    /// )
    /// .unwrap();
    ///
    /// table.insert_row(vec![Value::Int(1), Value::from("Alice")]).unwrap();
    /// assert!(table.insert_row(vec![Value::from("oops"), Value::Int(2)]).is_err());
    /// assert_eq!(table.row_count(), 1);
    /// ```
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        column_types: Option<Vec<DataType>>,
    ) -> DbResult<Self> {
        let name = name.into();

        if let Some(types) = &column_types {
            if types.len() != columns.len() {
                return Err(DbError::SchemaError {
                    table: name,
                    reason: format!(
                        "{} column types declared for {} columns",
                        types.len(),
                        columns.len()
                    ),
                });
            }
        }

        let mut index_of = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            check_column_name(&name, column)?;
            if index_of.insert(column.clone(), i).is_some() {
                return Err(DbError::SchemaError {
                    table: name,
                    reason: format!("duplicate column {column:?}"),
                });
            }
        }

        Ok(Self {
            name,
            columns,
            column_types,
            index_of,
            rows: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// insert a new row
    ///
    /// The row is validated entirely before being appended, so a failed insert
    /// leaves the table unchanged.
    pub fn insert_row(&mut self, values: Vec<Value>) -> DbResult<()> {
        if values.len() != self.columns.len() {
            return Err(DbError::ArityMismatch {
                table: self.name.clone(),
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        for (i, value) in values.iter().enumerate() {
            self.check_type(i, value)?;
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn get_row(&self, row_idx: usize) -> DbResult<&[Value]> {
        self.rows
            .get(row_idx)
            .map(Vec::as_slice)
            .ok_or_else(|| self.out_of_range(row_idx))
    }

    pub fn get_value(&self, row_idx: usize, column: &str) -> DbResult<&Value> {
        let col_idx = self.column_index(column)?;
        let row = self.get_row(row_idx)?;
        Ok(&row[col_idx])
    }

    /// Replaces one value, enforcing the column's declared type.
    pub fn set_value(&mut self, row_idx: usize, column: &str, value: Value) -> DbResult<()> {
        let col_idx = self.column_index(column)?;
        if row_idx >= self.rows.len() {
            return Err(self.out_of_range(row_idx));
        }
        self.check_type(col_idx, &value)?;
        self.rows[row_idx][col_idx] = value;
        Ok(())
    }

    /// Appends a column and back-fills `default_value` into every existing row.
    ///
    /// # Errors
    /// - [DbError::SchemaError] if the name is empty or contains whitespace.
    /// - [DbError::DuplicateColumn] if the name is already used.
    /// - [DbError::TypeMismatch] if `data_type` disagrees with the default's kind.
    /// - [DbError::SchemaError] if a typed table gets no type, or an untyped
    ///   table gets one.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        default_value: Value,
        data_type: Option<DataType>,
    ) -> DbResult<()> {
        let name = name.into();
        check_column_name(&self.name, &name)?;
        if self.index_of.contains_key(&name) {
            return Err(DbError::DuplicateColumn {
                table: self.name.clone(),
                column: name,
            });
        }
        if let Some(data_type) = data_type {
            if default_value.kind() != data_type {
                return Err(DbError::TypeMismatch(format!(
                    "default value {default_value:?} for column {name:?} is not {data_type}"
                )));
            }
        }

        match (&mut self.column_types, data_type) {
            (Some(types), Some(data_type)) => types.push(data_type),
            (None, None) => {}
            (Some(_), None) => {
                return Err(DbError::SchemaError {
                    table: self.name.clone(),
                    reason: format!("column {name:?} needs a type on a typed table"),
                });
            }
            (None, Some(_)) => {
                return Err(DbError::SchemaError {
                    table: self.name.clone(),
                    reason: format!("column {name:?} cannot be typed on an untyped table"),
                });
            }
        }

        self.index_of.insert(name.clone(), self.columns.len());
        self.columns.push(name);
        for row in &mut self.rows {
            row.push(default_value.clone());
        }
        Ok(())
    }

    /// Removes every row and keeps the schema.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }

    pub fn column_index_map(&self) -> &HashMap<String, usize> {
        &self.index_of
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_types(&self) -> Option<&[DataType]> {
        self.column_types.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterates over rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Position of `column` in the schema.
    pub fn column_index(&self, column: &str) -> DbResult<usize> {
        self.index_of
            .get(column)
            .copied()
            .ok_or_else(|| DbError::column_not_found(&self.name, column))
    }

    /// Drops every row past `len`. Used to undo an insert whose persistence failed.
    pub(crate) fn truncate_rows(&mut self, len: usize) {
        self.rows.truncate(len);
    }

    fn check_type(&self, col_idx: usize, value: &Value) -> DbResult<()> {
        let Some(types) = &self.column_types else {
            return Ok(());
        };
        let expected = types[col_idx];
        if value.kind() != expected {
            return Err(DbError::TypeMismatch(format!(
                "column {:?} of table {:?} is {expected}, got {} value {value:?}",
                self.columns[col_idx],
                self.name,
                value.kind()
            )));
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> DbError {
        DbError::IndexOutOfRange {
            table: self.name.clone(),
            index,
            len: self.rows.len(),
        }
    }
}

/// Column names are written bare, one per line, in table files.
fn check_column_name(table: &str, column: &str) -> DbResult<()> {
    if column.is_empty() || column.chars().any(char::is_whitespace) {
        return Err(DbError::SchemaError {
            table: table.to_string(),
            reason: format!("invalid column name {column:?}"),
        });
    }
    Ok(())
}
