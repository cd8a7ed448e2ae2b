//! Text encoding of a table file.
//!
//! ```text
//! <column_count>
//! <column_name>[ <type_id>]      one line per column
//! <row_count>
//! <type_id> <literal> ...        one line per row, one pair per value
//! ```
//!
//! Type ids are INT=0, STRING=1, BOOL=2, NULL=3. Strings are double-quoted with
//! `\\`, `\"`, `\n` and `\r` escaped; null is written as `null`.

use std::fmt::Write;

use crate::data_type::DataType;
use crate::error::{DbError, DbResult};
use crate::table::Table;
use crate::value::Value;

/// Serializes the whole schema and row set of `table`.
pub fn encode_table(table: &Table) -> String {
    let mut out = String::new();
    let columns = table.column_names();
    let types = table.column_types();

    // Writing to a String never fails.
    let _ = writeln!(out, "{}", columns.len());
    for (i, column) in columns.iter().enumerate() {
        match types {
            Some(types) => {
                let _ = writeln!(out, "{column} {}", types[i].type_id());
            }
            None => {
                let _ = writeln!(out, "{column}");
            }
        }
    }

    let _ = writeln!(out, "{}", table.row_count());
    for row in table.rows() {
        let mut first = true;
        for value in row {
            if !first {
                out.push(' ');
            }
            first = false;
            encode_value(&mut out, value);
        }
        out.push('\n');
    }
    out
}

fn encode_value(out: &mut String, value: &Value) {
    let _ = write!(out, "{} ", value.kind().type_id());
    match value {
        Value::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Value::Str(s) => {
            out.push('"');
            for ch in s.chars() {
                match ch {
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    c => out.push(c),
                }
            }
            out.push('"');
        }
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Null => out.push_str("null"),
    }
}

/// Parses a table file previously produced by [encode_table].
///
/// # Errors
/// Returns [DbError::MalformedPersistedData] on any count, type id or literal
/// that does not match the layout, and the usual [Table] errors if the decoded
/// schema or rows break its invariants.
pub fn decode_table(name: &str, text: &str) -> DbResult<Table> {
    let mut lines = Lines::new(name, text);

    let column_count = lines.next_count("column count")?;
    let mut columns = Vec::with_capacity(column_count);
    let mut types = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let line = lines.next_line("column definition")?;
        let mut parts = line.split(' ');
        let column = parts.next().unwrap_or_default();
        if column.is_empty() {
            return Err(lines.malformed("empty column name"));
        }
        let data_type = match parts.next() {
            Some(id) => Some(lines.parse_type_id(id)?),
            None => None,
        };
        if parts.next().is_some() {
            return Err(lines.malformed("unexpected content after column type"));
        }
        columns.push(column.to_string());
        types.push(data_type);
    }

    let column_types = if types.iter().all(Option::is_some) {
        Some(types.into_iter().flatten().collect::<Vec<_>>())
    } else if types.iter().all(Option::is_none) {
        None
    } else {
        return Err(lines.malformed("only some columns declare a type"));
    };
    // A zero-column table carries no type information either way.
    let column_types = column_types.filter(|types| !types.is_empty());

    let mut table =
        Table::new(name, columns, column_types).map_err(|e| lines.malformed(e.to_string()))?;

    let row_count = lines.next_count("row count")?;
    for _ in 0..row_count {
        let line = lines.next_line("row")?;
        let values = decode_row(line).map_err(|reason| lines.malformed(reason))?;
        if values.len() != column_count {
            return Err(lines.malformed(format!(
                "row has {} values, expected {column_count}",
                values.len()
            )));
        }
        table
            .insert_row(values)
            .map_err(|e| lines.malformed(e.to_string()))?;
    }

    if let Some(extra) = lines.remaining() {
        return Err(lines.malformed(format!("unexpected trailing content {extra:?}")));
    }

    Ok(table)
}

/// Cursor over the lines of a table file that tracks the current line number.
struct Lines<'a> {
    table: &'a str,
    inner: std::str::Lines<'a>,
    line: usize,
}

impl<'a> Lines<'a> {
    fn new(table: &'a str, text: &'a str) -> Self {
        Self {
            table,
            inner: text.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self, what: &str) -> DbResult<&'a str> {
        self.line += 1;
        self.inner
            .next()
            .ok_or_else(|| self.malformed(format!("missing {what}")))
    }

    fn next_count(&mut self, what: &str) -> DbResult<usize> {
        let line = self.next_line(what)?;
        line.trim()
            .parse()
            .map_err(|_| self.malformed(format!("invalid {what} {line:?}")))
    }

    fn parse_type_id(&self, token: &str) -> DbResult<DataType> {
        token
            .parse::<u8>()
            .ok()
            .and_then(DataType::from_type_id)
            .ok_or_else(|| self.malformed(format!("invalid type id {token:?}")))
    }

    fn remaining(&mut self) -> Option<&'a str> {
        self.line += 1;
        self.inner.find(|line| !line.trim().is_empty())
    }

    fn malformed(&self, reason: impl Into<String>) -> DbError {
        DbError::MalformedPersistedData {
            table: self.table.to_string(),
            line: self.line,
            reason: reason.into(),
        }
    }
}

fn decode_row(line: &str) -> Result<Vec<Value>, String> {
    let mut values = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if_eq(&' ').is_some() {}
        let Some(id) = chars.next() else {
            break;
        };
        let data_type = id
            .to_digit(10)
            .and_then(|d| DataType::from_type_id(d as u8))
            .ok_or_else(|| format!("invalid type id {id:?}"))?;
        if chars.next() != Some(' ') {
            return Err(format!("expected a space after type id {id}"));
        }

        let value = match data_type {
            DataType::Str => {
                if chars.next() != Some('"') {
                    return Err("string value must start with '\"'".into());
                }
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('\\') => s.push('\\'),
                            Some('"') => s.push('"'),
                            Some('n') => s.push('\n'),
                            Some('r') => s.push('\r'),
                            other => return Err(format!("invalid escape {other:?}")),
                        },
                        Some(c) => s.push(c),
                        None => return Err("unterminated string value".into()),
                    }
                }
                Value::Str(s)
            }
            _ => {
                let mut literal = String::new();
                while let Some(c) = chars.next_if(|c| *c != ' ') {
                    literal.push(c);
                }
                match (data_type, literal.as_str()) {
                    (DataType::Int, lit) => lit
                        .parse::<i64>()
                        .map(Value::Int)
                        .map_err(|_| format!("invalid integer {lit:?}"))?,
                    (DataType::Bool, "true") => Value::Bool(true),
                    (DataType::Bool, "false") => Value::Bool(false),
                    (DataType::Null, "null") => Value::Null,
                    (_, lit) => return Err(format!("invalid {data_type} literal {lit:?}")),
                }
            }
        };
        values.push(value);

        match chars.peek() {
            None | Some(' ') => {}
            Some(c) => return Err(format!("unexpected character {c:?} after value")),
        }
    }

    Ok(values)
}
