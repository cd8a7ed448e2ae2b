//! Database location settings.

use std::path::{Path, PathBuf};

/// Subdirectory of the home directory holding every database.
pub const PRODUCT_DIR: &str = ".simpledb";

/// Database used when none is given.
pub const DEFAULT_DATABASE: &str = "default";

/// Where a database lives: `<root>/<database_name>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_name: String,
    pub root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE)
    }
}

impl Config {
    /// Config for `database_name` under the [default_root].
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            root: default_root(),
        }
    }

    /// Overrides the root directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Directory holding the table files of this database.
    pub fn database_dir(&self) -> PathBuf {
        self.root.join(&self.database_name)
    }
}

/// `$HOME/.simpledb` when the home directory resolves, else the current
/// working directory.
pub fn default_root() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(PRODUCT_DIR),
        None => std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf()),
    }
}
