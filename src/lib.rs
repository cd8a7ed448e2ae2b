pub mod ast;
pub mod backend;
pub mod config;
pub mod data_type;
pub mod error;
pub mod format;
pub mod parser;
pub mod processor;
pub mod queries;
pub mod storage;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use config::Config;
pub use data_type::DataType;
pub use error::{DbError, DbResult};
pub use processor::{QueryOutcome, QueryProcessor, ResultSet};
pub use storage::{LoadReport, Storage};
pub use table::{ColumnDef, Table};
pub use value::Value;
