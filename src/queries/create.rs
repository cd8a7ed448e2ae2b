use crate::data_type::DataType;
use crate::error::DbResult;
use crate::storage::Storage;
use crate::table::ColumnDef;

pub struct CreateQuery<'a> {
    storage: &'a mut Storage,
}

impl<'a> CreateQuery<'a> {
    pub fn new(storage: &'a mut Storage) -> Self {
        Self { storage }
    }

    /// Creates a new table in the storage.
    pub fn create_table(
        &mut self,
        name: &str,
        columns: Vec<String>,
        column_types: Option<Vec<DataType>>,
    ) -> DbResult<()> {
        self.storage.create_table(name, columns, column_types)
    }

    /// Creates a table from `CREATE TABLE` column definitions. The table is
    /// typed only when every definition carries a type.
    pub fn create_from_defs(&mut self, name: &str, defs: Vec<ColumnDef>) -> DbResult<()> {
        let types: Option<Vec<DataType>> = defs.iter().map(|def| def.data_type).collect();
        let columns = defs.into_iter().map(|def| def.name).collect();
        self.create_table(name, columns, types)
    }
}
