use tracing::warn;

use crate::error::DbResult;
use crate::storage::Storage;
use crate::value::Value;

pub struct InsertQuery<'a> {
    storage: &'a mut Storage,
}

impl<'a> InsertQuery<'a> {
    pub fn new(storage: &'a mut Storage) -> Self {
        Self { storage }
    }

    /// Appends one row to `table` in memory.
    pub fn insert_into(&mut self, table: &str, values: Vec<Value>) -> DbResult<()> {
        self.storage.get_table(table)?.insert_row(values)
    }

    /// Appends one row and immediately rewrites the table file.
    ///
    /// If the write fails the row is removed again, so memory and disk never
    /// disagree about a failed insert.
    pub fn insert_and_persist(&mut self, table: &str, values: Vec<Value>) -> DbResult<()> {
        let previous_len = self.storage.get_table_const(table)?.row_count();
        self.insert_into(table, values)?;

        if let Err(error) = self.storage.persist_table(table) {
            warn!(table, %error, "persisting insert failed, rolling back row");
            self.storage.get_table(table)?.truncate_rows(previous_len);
            return Err(error);
        }
        Ok(())
    }
}
