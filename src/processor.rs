use tracing::debug;

use crate::{
    Value,
    ast::{ColumnsSelect, Select, Statement},
    error::DbResult,
    parser::parse_statement,
    queries::{CreateQuery, InsertQuery, Projection, SelectQuery},
    storage::Storage,
};

/// Represents the result of a successful `SELECT` query.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// The names of the columns included in the result set, in request order.
    pub columns: Vec<String>,
    /// The actual data, one vector of [Value] per row, in insertion order.
    pub rows: Vec<Vec<Value>>,
}

impl From<Projection> for ResultSet {
    fn from(projection: Projection) -> Self {
        let (columns, rows) = projection.into_rows();
        Self { columns, rows }
    }
}

/// What a successfully executed command did.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Created { table: String, columns: Vec<String> },
    Inserted { table: String },
    Rows(ResultSet),
}

/// Parses and executes one command at a time against a [Storage].
pub struct QueryProcessor<'a> {
    storage: &'a mut Storage,
}

impl<'a> QueryProcessor<'a> {
    pub fn new(storage: &'a mut Storage) -> Self {
        Self { storage }
    }

    /// Executes a single command.
    ///
    /// `INSERT` rewrites the table file right after the row is appended. A
    /// failing command leaves memory and disk as they were.
    ///
    /// # Errors
    /// Returns [DbError::Syntax](crate::DbError::Syntax) for malformed
    /// commands and the storage or table error otherwise.
    ///
    /// # Example
    /// ```
    /// use simpledb::{MemoryBackend, QueryOutcome, QueryProcessor, Storage, Value};
    ///
    /// let mut storage = Storage::with_backend("db", Box::new(MemoryBackend::new())).unwrap();
    /// let mut processor = QueryProcessor::new(&mut storage);
    /// processor.execute("CREATE TABLE users id,name,age").unwrap();
    /// processor.execute("INSERT INTO users VALUES 1,\"Alice\",true").unwrap();
    ///
    /// let QueryOutcome::Rows(result) = processor.execute("SELECT * FROM users").unwrap() else {
    ///     panic!("expected rows");
    /// };
    /// assert_eq!(result.rows, vec![vec![Value::Int(1), Value::from("Alice"), Value::Bool(true)]]);
    /// ```
    pub fn execute(&mut self, input: &str) -> DbResult<QueryOutcome> {
        let statement = parse_statement(input)?;
        debug!(?statement, "executing statement");

        match statement {
            Statement::CreateTable(create) => {
                let columns = create.columns.iter().map(|c| c.name.clone()).collect();
                CreateQuery::new(&mut *self.storage)
                    .create_from_defs(&create.name, create.columns)?;
                Ok(QueryOutcome::Created {
                    table: create.name,
                    columns,
                })
            }
            Statement::InsertInto(insert) => {
                InsertQuery::new(&mut *self.storage)
                    .insert_and_persist(&insert.table, insert.values)?;
                Ok(QueryOutcome::Inserted {
                    table: insert.table,
                })
            }
            Statement::Select(select) => self.select(select).map(QueryOutcome::Rows),
        }
    }

    /// Executes a command that must be a `SELECT` and returns its rows.
    pub fn query(&mut self, input: &str) -> DbResult<ResultSet> {
        match self.execute(input)? {
            QueryOutcome::Rows(result) => Ok(result),
            other => Err(crate::DbError::Syntax(format!(
                "statement is not a query: {other:?}"
            ))),
        }
    }

    fn select(&self, select: Select) -> DbResult<ResultSet> {
        let query = SelectQuery::new(&*self.storage);

        let columns = match select.columns {
            ColumnsSelect::Star => vec!["*".to_string()],
            ColumnsSelect::ColumnsNames(names) => names,
        };

        match (select.where_clause, columns.as_slice()) {
            (Some(clause), _) => query
                .select_where(&select.table, &columns, &clause.value, &clause.column)
                .map(ResultSet::from),
            (None, [star]) if star == "*" => {
                let table = query.select_all(&select.table)?;
                Ok(ResultSet {
                    columns: table.column_names().to_vec(),
                    rows: table.rows().map(<[Value]>::to_vec).collect(),
                })
            }
            (None, _) => query
                .select_columns(&select.table, &columns)
                .map(ResultSet::from),
        }
    }
}
