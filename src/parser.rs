use crate::error::{DbError, DbResult};
use crate::tokenizer::{Token, Tokenizer};
use crate::{ColumnDef, DataType, Value, ast::*};

pub struct Parser {
    tokens: Vec<Token>,
    /// Source spelling of each token, used for bare-word literals.
    texts: Vec<String>,
    position: usize,
}

/// Tokenizes and parses one command.
pub fn parse_statement(input: &str) -> DbResult<Statement> {
    let tokens = Tokenizer::new(input).tokenize_with_text()?;
    Parser::new(tokens).parse()
}

impl Parser {
    /// Takes the output of [Tokenizer::tokenize_with_text]. A missing trailing
    /// [Token::Eof] is added.
    pub(crate) fn new(tokens: Vec<(Token, String)>) -> Self {
        let (mut tokens, mut texts): (Vec<Token>, Vec<String>) = tokens.into_iter().unzip();
        if tokens.last() != Some(&Token::Eof) {
            tokens.push(Token::Eof);
            texts.push(String::new());
        }
        Self {
            tokens,
            texts,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> DbResult<Statement> {
        let statement = match self.current_token() {
            Token::Create => self.parse_create_table(),
            Token::Insert => self.parse_insert(),
            Token::Select => self.parse_select(),
            Token::Eof => Err(syntax("empty command")),
            other => Err(syntax(format!("unknown command starting with {other:?}"))),
        }?;

        // semicolon is optional so skip it
        if matches!(self.current_token(), Token::Semicolon) {
            self.advance();
        }

        // Check we are at the end of the statement
        if !self.is_at_end() {
            return Err(syntax(format!(
                "unexpected token after statement: {:?}",
                self.current_token()
            )));
        }

        Ok(statement)
    }

    //helpers
    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof)
    }

    /// End of the statement proper: end of input or the optional semicolon.
    fn is_at_statement_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof | Token::Semicolon)
    }

    fn skip_comma(&mut self) -> bool {
        if matches!(self.current_token(), Token::Comma) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, expected: Token) -> DbResult<()> {
        if *self.current_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(syntax(format!(
                "expected {:?}, found {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    fn consume_ident(&mut self, what: &str) -> DbResult<String> {
        match self.current_token() {
            Token::Ident(string) => {
                let string = string.clone();
                self.advance();
                Ok(string)
            }
            other => Err(syntax(format!("expected {what}, found {other:?}"))),
        }
    }

    /// Classifies the current token as a literal.
    ///
    /// Quoted strings, booleans and integers map to their kind; any other word
    /// (including a keyword) becomes a string holding the word as typed, so
    /// literals never fail on unquoted text.
    fn consume_literal(&mut self) -> DbResult<Value> {
        let value = match self.current_token() {
            Token::String(s) => Value::Str(s.clone()),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Number(n) => Value::Int(*n),
            Token::Comma | Token::Semicolon | Token::Equal | Token::Eof => {
                return Err(syntax(format!(
                    "expected a value, found {:?}",
                    self.current_token()
                )));
            }
            _ => Value::Str(self.texts[self.position].clone()),
        };
        self.advance();
        Ok(value)
    }

    /// A type name directly following a column name.
    fn consume_optional_data_type(&mut self) -> Option<DataType> {
        let data_type = match self.current_token() {
            Token::Ident(word) => DataType::from_type_name(word)?,
            _ => return None,
        };
        self.advance();
        Some(data_type)
    }

    fn parse_column_def(&mut self) -> DbResult<ColumnDef> {
        let name = self.consume_ident("column name")?;
        let data_type = self.consume_optional_data_type();
        Ok(ColumnDef { name, data_type })
    }

    fn parse_create_table(&mut self) -> DbResult<Statement> {
        self.consume(Token::Create)?; // advance if CREATE
        self.consume(Token::Table)?; // advance if TABLE
        let name = self.consume_ident("table name")?;

        let mut columns = vec![self.parse_column_def()?];
        loop {
            let had_comma = self.skip_comma();
            if self.is_at_statement_end() {
                if had_comma {
                    return Err(syntax("expected column name after ','"));
                }
                break;
            }
            columns.push(self.parse_column_def()?);
        }

        let typed = columns.iter().filter(|c| c.data_type.is_some()).count();
        if typed != 0 && typed != columns.len() {
            return Err(syntax("either every column declares a type or none does"));
        }

        Ok(Statement::CreateTable(CreateTable { name, columns }))
    }

    fn parse_insert(&mut self) -> DbResult<Statement> {
        self.consume(Token::Insert)?;
        self.consume(Token::Into)?;
        let table = self.consume_ident("table name")?;
        self.consume(Token::Values)?;

        let mut values = vec![self.consume_literal()?];
        loop {
            let had_comma = self.skip_comma();
            if self.is_at_statement_end() {
                if had_comma {
                    return Err(syntax("expected value after ','"));
                }
                break;
            }
            values.push(self.consume_literal()?);
        }

        Ok(Statement::InsertInto(InsertInto { table, values }))
    }

    fn parse_select(&mut self) -> DbResult<Statement> {
        self.consume(Token::Select)?;

        let columns = if matches!(self.current_token(), Token::Star) {
            self.advance();
            ColumnsSelect::Star
        } else {
            let mut names = vec![self.consume_ident("column name")?];
            loop {
                let had_comma = self.skip_comma();
                if matches!(self.current_token(), Token::From) {
                    if had_comma {
                        return Err(syntax("expected column name after ','"));
                    }
                    break;
                }
                names.push(self.consume_ident("column name or FROM")?);
            }
            ColumnsSelect::ColumnsNames(names)
        };

        self.consume(Token::From)?;
        let table = self.consume_ident("table name")?;

        let where_clause = if matches!(self.current_token(), Token::Where) {
            self.advance();
            let column = self.consume_ident("column name")?;
            self.consume(Token::Equal)?;
            let value = self.consume_literal()?;
            Some(WhereClause { column, value })
        } else {
            None
        };

        Ok(Statement::Select(Select {
            columns,
            table,
            where_clause,
        }))
    }
}

fn syntax(message: impl Into<String>) -> DbError {
    DbError::Syntax(message.into())
}
