//! Where serialized tables live.
//!
//! [FileBackend] writes one `<table>.tbl` file per table inside a database
//! directory. [MemoryBackend] keeps the same text in a map and is used by tests
//! and benchmarks that should not touch the filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DbError, DbResult};

/// Extension of persisted table files.
pub const TABLE_FILE_EXTENSION: &str = "tbl";

/// Storage medium for serialized tables.
pub trait Backend {
    /// Prepares the medium (e.g. creates the database directory).
    fn prepare(&mut self) -> DbResult<()>;

    /// Names of every persisted table, in a stable order.
    fn list_tables(&self) -> DbResult<Vec<String>>;

    /// Reads the serialized form of one table.
    fn read_table(&self, name: &str) -> DbResult<String>;

    /// Replaces the serialized form of one table.
    fn write_table(&mut self, name: &str, contents: &str) -> DbResult<()>;
}

/// One file per table under a database directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `table`.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.{TABLE_FILE_EXTENSION}"))
    }
}

impl Backend for FileBackend {
    fn prepare(&mut self) -> DbResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| DbError::io(&self.dir, e))
    }

    fn list_tables(&self) -> DbResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| DbError::io(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| DbError::io(&self.dir, e))?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(TABLE_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_table(&self, name: &str) -> DbResult<String> {
        let path = self.table_path(name);
        fs::read_to_string(&path).map_err(|e| DbError::io(path, e))
    }

    fn write_table(&mut self, name: &str, contents: &str) -> DbResult<()> {
        // Plain overwrite: an interrupted write can leave a truncated file.
        let path = self.table_path(name);
        fs::write(&path, contents).map_err(|e| DbError::io(path, e))
    }
}

/// Keeps serialized tables in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    files: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialized text of `table`, if it was ever written.
    pub fn contents(&self, table: &str) -> Option<&str> {
        self.files.get(table).map(String::as_str)
    }

    /// Stores raw text for `table`, bypassing the encoder.
    pub fn insert_raw(&mut self, table: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(table.into(), contents.into());
    }
}

impl Backend for MemoryBackend {
    fn prepare(&mut self) -> DbResult<()> {
        Ok(())
    }

    fn list_tables(&self) -> DbResult<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read_table(&self, name: &str) -> DbResult<String> {
        self.files.get(name).cloned().ok_or_else(|| {
            DbError::io(
                format!("{name}.{TABLE_FILE_EXTENSION}"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "table file not found"),
            )
        })
    }

    fn write_table(&mut self, name: &str, contents: &str) -> DbResult<()> {
        self.files.insert(name.to_string(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_lists_only_table_files() {
        let tmp = TempDir::new().unwrap();
        let mut backend = FileBackend::new(tmp.path().join("db"));
        backend.prepare().unwrap();

        backend.write_table("users", "0\n0\n").unwrap();
        backend.write_table("accounts", "0\n0\n").unwrap();
        fs::write(backend.dir().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(backend.dir().join("nested.tbl")).unwrap();

        assert_eq!(backend.list_tables().unwrap(), vec!["accounts", "users"]);
        assert_eq!(backend.read_table("users").unwrap(), "0\n0\n");
    }

    #[test]
    fn test_file_backend_overwrites() {
        let tmp = TempDir::new().unwrap();
        let mut backend = FileBackend::new(tmp.path());
        backend.prepare().unwrap();

        backend.write_table("t", "first version, longer").unwrap();
        backend.write_table("t", "second").unwrap();

        assert_eq!(backend.read_table("t").unwrap(), "second");
        assert_eq!(backend.table_path("t"), tmp.path().join("t.tbl"));
    }

    #[test]
    fn test_file_backend_missing_table() {
        let tmp = TempDir::new().unwrap();
        let backend = FileBackend::new(tmp.path());
        assert!(matches!(backend.read_table("ghost"), Err(DbError::Io { .. })));
    }

    #[test]
    fn test_memory_backend() {
        let mut backend = MemoryBackend::new();
        backend.write_table("b", "x").unwrap();
        backend.insert_raw("a", "y");

        assert_eq!(backend.list_tables().unwrap(), vec!["a", "b"]);
        assert_eq!(backend.contents("b"), Some("x"));
        assert!(matches!(backend.read_table("c"), Err(DbError::Io { .. })));
    }
}
