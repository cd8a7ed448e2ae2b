use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::backend::{Backend, FileBackend};
use crate::config::Config;
use crate::data_type::DataType;
use crate::error::{DbError, DbResult};
use crate::format::{decode_table, encode_table};
use crate::table::Table;

/// The registry owning every table of one database, plus their persistence.
///
/// Nothing touches the backend until [Storage::open] (or
/// [Storage::with_backend]) runs, which prepares the medium and loads every
/// persisted table.
pub struct Storage {
    database_name: String,
    /// A map of table names to their respective [Table] structures.
    tables: BTreeMap<String, Table>,
    backend: Box<dyn Backend>,
}

/// Outcome of [Storage::load_all_tables].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Tables that were loaded, in backend listing order.
    pub loaded: Vec<String>,
    /// Tables that could not be loaded, with the reason.
    pub failed: Vec<(String, DbError)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Storage {
    /// Opens the database stored under `<root>/<database_name>/`.
    ///
    /// The directory is created if absent and every `*.tbl` file found there
    /// is loaded. Tables that fail to load are logged and skipped.
    ///
    /// # Example
    /// ```
    /// use simpledb::{Storage, Value};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// {
    ///     let mut storage = Storage::open("shop", dir.path()).unwrap();
    ///     storage.create_table("items", vec!["sku".into()], None).unwrap();
    ///     storage.get_table("items").unwrap().insert_row(vec![Value::Int(7)]).unwrap();
    ///     storage.persist_table("items").unwrap();
    /// }
    ///
    /// let storage = Storage::open("shop", dir.path()).unwrap();
    /// let items = storage.get_table_const("items").unwrap();
    /// assert_eq!(items.get_row(0).unwrap(), [Value::Int(7)]);
    /// ```
    pub fn open(database_name: impl Into<String>, root: impl AsRef<Path>) -> DbResult<Self> {
        let database_name = database_name.into();
        let dir = root.as_ref().join(&database_name);
        Self::with_backend(database_name, Box::new(FileBackend::new(dir)))
    }

    /// Opens the database described by `config`.
    pub fn open_with_config(config: &Config) -> DbResult<Self> {
        Self::open(config.database_name.clone(), &config.root)
    }

    /// Opens a database over an arbitrary [Backend].
    pub fn with_backend(
        database_name: impl Into<String>,
        mut backend: Box<dyn Backend>,
    ) -> DbResult<Self> {
        backend.prepare()?;
        let mut storage = Self {
            database_name: database_name.into(),
            tables: BTreeMap::new(),
            backend,
        };
        let report = storage.load_all_tables()?;
        info!(
            database = %storage.database_name,
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "database opened"
        );
        Ok(storage)
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Creates and registers an empty table.
    ///
    /// # Errors
    /// Returns [DbError::TableAlreadyExists] if the name is taken, in which case
    /// the existing table is left untouched, and [DbError::SchemaError] if the
    /// name cannot be used as a file name.
    pub fn create_table(
        &mut self,
        name: &str,
        columns: Vec<String>,
        column_types: Option<Vec<DataType>>,
    ) -> DbResult<()> {
        check_table_name(name)?;
        if self.tables.contains_key(name) {
            return Err(DbError::TableAlreadyExists(name.to_string()));
        }
        let table = Table::new(name, columns, column_types)?;
        info!(table = name, columns = ?table.column_names(), "table created");
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    /// Retrieves a mutable reference to a table by name.
    pub fn get_table(&mut self, name: &str) -> DbResult<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    /// Retrieves a reference to a table by name.
    pub fn get_table_const(&self, name: &str) -> DbResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    /// Iterates over every registered table, ordered by name.
    pub fn get_all_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Returns the names of all registered tables, ordered.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Writes the full schema and rows of `name`, replacing its previous file.
    pub fn persist_table(&mut self, name: &str) -> DbResult<()> {
        let table = self
            .tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;
        let contents = encode_table(table);
        self.backend.write_table(name, &contents)?;
        debug!(table = name, rows = table.row_count(), "table persisted");
        Ok(())
    }

    /// Persists every table.
    ///
    /// A failing table does not stop the others from being written. Each
    /// failure is logged and reported together in
    /// [DbError::PersistFailed].
    pub fn persist_all(&mut self) -> DbResult<()> {
        let mut failed = Vec::new();
        let mut first = None;
        for name in self.table_names() {
            if let Err(error) = self.persist_table(&name) {
                warn!(table = %name, %error, "failed to persist table");
                failed.push(name);
                first.get_or_insert(error);
            }
        }
        match first {
            None => Ok(()),
            Some(first) => Err(DbError::PersistFailed {
                tables: failed,
                first: Box::new(first),
            }),
        }
    }

    /// Loads `name` from the backend, replacing any in-memory table of that name.
    ///
    /// # Errors
    /// [DbError::Io] if the file cannot be read and
    /// [DbError::MalformedPersistedData] if its content is corrupt.
    pub fn load_table(&mut self, name: &str) -> DbResult<()> {
        check_table_name(name)?;
        let contents = self.backend.read_table(name)?;
        let table = decode_table(name, &contents)?;
        debug!(table = name, rows = table.row_count(), "table loaded");
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    /// Loads every table the backend knows about.
    ///
    /// A table that fails to load is logged and recorded in the report; the
    /// others are still loaded. Only a failure to list the backend is an error.
    pub fn load_all_tables(&mut self) -> DbResult<LoadReport> {
        let mut report = LoadReport::default();
        for name in self.backend.list_tables()? {
            match self.load_table(&name) {
                Ok(()) => report.loaded.push(name),
                Err(error) => {
                    warn!(table = %name, %error, "skipping table that failed to load");
                    report.failed.push((name, error));
                }
            }
        }
        Ok(report)
    }
}

/// Table names become file names, so they must stay inside the database
/// directory.
fn check_table_name(name: &str) -> DbResult<()> {
    let invalid = name.is_empty()
        || name.contains("..")
        || name
            .chars()
            .any(|c| matches!(c, '/' | '\\') || c.is_control() || c.is_whitespace());
    if invalid {
        return Err(DbError::SchemaError {
            table: name.to_string(),
            reason: "not usable as a file name".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::value::Value;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Backend that refuses to write `bad` and records every other write.
    struct FlakyBackend {
        written: Rc<RefCell<BTreeSet<String>>>,
    }

    impl Backend for FlakyBackend {
        fn prepare(&mut self) -> DbResult<()> {
            Ok(())
        }

        fn list_tables(&self) -> DbResult<Vec<String>> {
            Ok(Vec::new())
        }

        fn read_table(&self, name: &str) -> DbResult<String> {
            Err(DbError::io(name, io::Error::new(io::ErrorKind::NotFound, "missing")))
        }

        fn write_table(&mut self, name: &str, _contents: &str) -> DbResult<()> {
            if name == "bad" {
                return Err(DbError::io(
                    name,
                    io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
                ));
            }
            self.written.borrow_mut().insert(name.to_string());
            Ok(())
        }
    }

    fn memory_storage() -> Storage {
        Storage::with_backend("test", Box::new(MemoryBackend::new())).unwrap()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_create_and_get_table() {
        let mut storage = memory_storage();
        storage.create_table("users", cols(&["id", "name"]), None).unwrap();

        let table = storage.get_table_const("users").unwrap();
        assert_eq!(table.name(), "users");
        assert_eq!(table.row_count(), 0);
        assert_eq!(storage.table_names(), vec!["users"]);
    }

    #[test]
    fn test_duplicate_table_error() {
        let mut storage = memory_storage();
        storage.create_table("users", cols(&["id"]), None).unwrap();
        storage
            .get_table("users")
            .unwrap()
            .insert_row(vec![Value::Int(1)])
            .unwrap();

        let err = storage.create_table("users", cols(&["other"]), None).unwrap_err();
        assert!(matches!(err, DbError::TableAlreadyExists(name) if name == "users"));

        let table = storage.get_table_const("users").unwrap();
        assert_eq!(table.column_names(), ["id"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_table_names_stay_inside_the_database_dir() {
        let tmp = TempDir::new().unwrap();
        let mut storage = Storage::open("db", tmp.path()).unwrap();

        for bad in ["../escape", "a/b", "a\\b", "..", "", "two words"] {
            let err = storage.create_table(bad, cols(&["a"]), None).unwrap_err();
            assert!(matches!(err, DbError::SchemaError { .. }), "{bad:?} gave {err:?}");
            assert!(matches!(storage.load_table(bad), Err(DbError::SchemaError { .. })));
        }
        assert!(storage.table_names().is_empty());
        assert!(!tmp.path().join("escape.tbl").exists());

        storage.create_table("ok_name-2", cols(&["a"]), None).unwrap();
        storage.persist_all().unwrap();
        let storage = Storage::open("db", tmp.path()).unwrap();
        assert_eq!(storage.table_names(), vec!["ok_name-2"]);
    }

    #[test]
    fn test_persist_all_continues_past_failures() {
        let written = Rc::new(RefCell::new(BTreeSet::new()));
        let backend = FlakyBackend {
            written: Rc::clone(&written),
        };
        let mut storage = Storage::with_backend("db", Box::new(backend)).unwrap();
        for name in ["a", "bad", "c"] {
            storage.create_table(name, cols(&["x"]), None).unwrap();
        }

        let err = storage.persist_all().unwrap_err();
        match err {
            DbError::PersistFailed { tables, first } => {
                assert_eq!(tables, vec!["bad"]);
                assert!(matches!(*first, DbError::Io { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
        let written: Vec<String> = written.borrow().iter().cloned().collect();
        assert_eq!(written, vec!["a", "c"]);
    }

    #[test]
    fn test_missing_table() {
        let mut storage = memory_storage();
        assert!(matches!(storage.get_table("nope"), Err(DbError::TableNotFound(_))));
        assert!(matches!(storage.get_table_const("nope"), Err(DbError::TableNotFound(_))));
        assert!(matches!(storage.persist_table("nope"), Err(DbError::TableNotFound(_))));
        assert!(matches!(storage.load_table("nope"), Err(DbError::Io { .. })));
    }

    #[test]
    fn test_persist_and_reload_from_disk() {
        let tmp = TempDir::new().unwrap();
        {
            let mut storage = Storage::open("db", tmp.path()).unwrap();
            storage
                .create_table(
                    "users",
                    cols(&["id", "name", "active"]),
                    Some(vec![DataType::Int, DataType::Str, DataType::Bool]),
                )
                .unwrap();
            storage.create_table("notes", cols(&["body", "extra"]), None).unwrap();

            let users = storage.get_table("users").unwrap();
            users
                .insert_row(vec![Value::Int(1), Value::from("Alice"), Value::Bool(true)])
                .unwrap();
            users
                .insert_row(vec![Value::Int(2), Value::from("Bob Smith"), Value::Bool(false)])
                .unwrap();
            storage
                .get_table("notes")
                .unwrap()
                .insert_row(vec![Value::from("x"), Value::Null])
                .unwrap();
            storage.persist_all().unwrap();
        }
        assert!(tmp.path().join("db").join("users.tbl").is_file());

        let storage = Storage::open("db", tmp.path()).unwrap();
        let users = storage.get_table_const("users").unwrap();
        assert_eq!(
            users.column_types(),
            Some(&[DataType::Int, DataType::Str, DataType::Bool][..])
        );
        assert_eq!(users.row_count(), 2);
        assert_eq!(
            users.get_row(1).unwrap(),
            [Value::Int(2), Value::from("Bob Smith"), Value::Bool(false)]
        );
        let notes = storage.get_table_const("notes").unwrap();
        assert_eq!(notes.column_types(), None);
        assert_eq!(notes.get_row(0).unwrap(), [Value::from("x"), Value::Null]);
    }

    #[test]
    fn test_persist_overwrites_previous_file() {
        let tmp = TempDir::new().unwrap();
        let mut storage = Storage::open("db", tmp.path()).unwrap();
        storage.create_table("t", cols(&["n"]), None).unwrap();
        for i in 0..3 {
            storage.get_table("t").unwrap().insert_row(vec![Value::Int(i)]).unwrap();
            storage.persist_table("t").unwrap();
        }

        let contents = fs::read_to_string(tmp.path().join("db").join("t.tbl")).unwrap();
        assert_eq!(contents, "1\nn\n3\n0 0\n0 1\n0 2\n");
    }

    #[test]
    fn test_load_all_tables_skips_corrupt_files() {
        let mut backend = MemoryBackend::new();
        backend.insert_raw("good", "1\nid\n1\n0 5\n");
        backend.insert_raw("bad", "1\nid\n1\n0 five\n");
        backend.insert_raw("worse", "not a table");

        let mut storage = Storage::with_backend("db", Box::new(backend)).unwrap();
        assert_eq!(storage.table_names(), vec!["good"]);

        let report = storage.load_all_tables().unwrap();
        assert_eq!(report.loaded, vec!["good"]);
        assert!(!report.is_clean());
        let failed: Vec<&str> = report.failed.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(failed, vec!["bad", "worse"]);
        assert!(
            report
                .failed
                .iter()
                .all(|(_, e)| matches!(e, DbError::MalformedPersistedData { .. }))
        );
    }

    #[test]
    fn test_load_table_replaces_memory_state() {
        let mut storage = memory_storage();
        storage.create_table("t", cols(&["n"]), None).unwrap();
        storage.get_table("t").unwrap().insert_row(vec![Value::Int(1)]).unwrap();
        storage.persist_table("t").unwrap();

        storage.get_table("t").unwrap().insert_row(vec![Value::Int(2)]).unwrap();
        assert_eq!(storage.get_table_const("t").unwrap().row_count(), 2);

        storage.load_table("t").unwrap();
        assert_eq!(storage.get_table_const("t").unwrap().row_count(), 1);
    }

    #[test]
    fn test_get_all_tables() {
        let mut storage = memory_storage();
        storage.create_table("b", cols(&["x"]), None).unwrap();
        storage.create_table("a", cols(&["y"]), None).unwrap();

        let names: Vec<&str> = storage.get_all_tables().map(Table::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
