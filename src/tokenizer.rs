use crate::error::{DbError, DbResult};

/// Represents the smallest meaningful units (atoms) of the command language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- Keywords ---
    Create,
    Table,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,

    // --- Identifiers & Literals ---
    /// A bare word: a table or column name, a type name, or an unquoted literal.
    Ident(String),
    /// A signed 64-bit integer literal (e.g., `42`, `-7`).
    Number(i64),
    /// A string literal, defined between double quotes (e.g., `"Alice"`).
    String(String),
    /// The boolean literal `true`.
    True,
    /// The boolean literal `false`.
    False,

    // --- Symbols ---
    /// Comma `,`
    Comma,
    /// Semicolon `;`
    Semicolon,
    /// Wildcard symbol `*`
    Star,
    /// Equal to
    Equal,

    // --- Special ---
    /// Represents the end of the command.
    Eof,
}

/// A lexical scanner that converts a command line into a sequence of [Token]s.
///
/// Tokens are separated by whitespace; `,`, `;`, `*` and `=` are tokens of
/// their own even when glued to a word, so `1,"Alice",true` yields three
/// literals separated by commas.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens ending with
    /// [Token::Eof].
    ///
    /// # Errors
    /// Returns [DbError::Syntax] if a quoted string is not terminated.
    ///
    /// # Example
    /// ```
    /// # use simpledb::tokenizer::{Tokenizer, Token};
    /// let tokens = Tokenizer::new("SELECT * FROM users").tokenize().unwrap();
    /// assert_eq!(tokens[0], Token::Select);
    /// assert_eq!(tokens[1], Token::Star);
    /// ```
    pub fn tokenize(&mut self) -> DbResult<Vec<Token>> {
        let tokens = self.tokenize_with_text()?;
        Ok(tokens.into_iter().map(|(token, _)| token).collect())
    }

    /// Like [Tokenizer::tokenize], but pairs every token with the exact text it
    /// was read from. [Token::Eof] is paired with an empty string.
    pub fn tokenize_with_text(&mut self) -> DbResult<Vec<(Token, String)>> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            let start = self.position;
            let token = self.next_token()?;
            let text: String = self.input[start..self.position].iter().collect();
            tokens.push((token, text));
        }

        tokens.push((Token::Eof, String::new()));
        Ok(tokens)
    }

    /// Identifies the next token based on the character at the current position.
    fn next_token(&mut self) -> DbResult<Token> {
        let ch = self.current_char();

        match ch {
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ';' => {
                self.advance();
                Ok(Token::Semicolon)
            }
            '*' => {
                self.advance();
                Ok(Token::Star)
            }
            '=' => {
                self.advance();
                Ok(Token::Equal)
            }
            '"' => self.read_string(),
            _ => Ok(self.read_word()),
        }
    }

    // --- Navigation Helpers ---

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn is_delimiter(ch: char) -> bool {
        ch.is_whitespace() || matches!(ch, ',' | ';' | '*' | '=' | '"')
    }

    // --- Extraction Logic ---

    /// Reads a run of non-delimiter characters and classifies it as a keyword,
    /// a boolean, an integer or an identifier. Command keywords are matched
    /// case-insensitively, `true` and `false` only in lowercase.
    fn read_word(&mut self) -> Token {
        let mut word = String::new();

        while !self.is_at_end() && !Self::is_delimiter(self.current_char()) {
            word.push(self.current_char());
            self.advance();
        }

        match word.as_str() {
            "true" => return Token::True,
            "false" => return Token::False,
            _ => {}
        }

        match word.to_uppercase().as_str() {
            "CREATE" => return Token::Create,
            "TABLE" => return Token::Table,
            "INSERT" => return Token::Insert,
            "INTO" => return Token::Into,
            "VALUES" => return Token::Values,
            "SELECT" => return Token::Select,
            "FROM" => return Token::From,
            "WHERE" => return Token::Where,
            _ => {}
        }

        match word.parse::<i64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Ident(word),
        }
    }

    /// Reads a string literal enclosed in double quotes.
    fn read_string(&mut self) -> DbResult<Token> {
        self.advance(); // Skip the opening quote

        let mut string = String::new();
        while !self.is_at_end() && self.current_char() != '"' {
            string.push(self.current_char());
            self.advance();
        }

        if self.is_at_end() {
            return Err(DbError::Syntax(format!("unterminated string literal \"{string}")));
        }

        // Skip the closing quote
        self.advance();

        Ok(Token::String(string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Tokenizer::new(input).tokenize().unwrap()
    }

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(
            tokenize("CREATE TABLE users"),
            vec![
                Token::Create,
                Token::Table,
                Token::Ident("users".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            tokenize("select * from t where ok = true"),
            vec![
                Token::Select,
                Token::Star,
                Token::From,
                Token::Ident("t".into()),
                Token::Where,
                Token::Ident("ok".into()),
                Token::Equal,
                Token::True,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_booleans_are_lowercase_only() {
        assert_eq!(
            tokenize("true false True FALSE"),
            vec![
                Token::True,
                Token::False,
                Token::Ident("True".into()),
                Token::Ident("FALSE".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokens_keep_their_spelling() {
        let tokens = Tokenizer::new("from Values \"a b\",7").tokenize_with_text().unwrap();
        assert_eq!(
            tokens,
            vec![
                (Token::From, "from".to_string()),
                (Token::Values, "Values".to_string()),
                (Token::String("a b".into()), "\"a b\"".to_string()),
                (Token::Comma, ",".to_string()),
                (Token::Number(7), "7".to_string()),
                (Token::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_glued_commas_split_items() {
        assert_eq!(
            tokenize("1,\"Alice\",true"),
            vec![
                Token::Number(1),
                Token::Comma,
                Token::String("Alice".into()),
                Token::Comma,
                Token::True,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_trailing_comma_is_its_own_token() {
        assert_eq!(
            tokenize("id, name"),
            vec![
                Token::Ident("id".into()),
                Token::Comma,
                Token::Ident("name".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(
            tokenize("42 -7 +3 0"),
            vec![
                Token::Number(42),
                Token::Number(-7),
                Token::Number(3),
                Token::Number(0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unparseable_numbers_stay_words() {
        assert_eq!(
            tokenize("3.14 12abc 99999999999999999999"),
            vec![
                Token::Ident("3.14".into()),
                Token::Ident("12abc".into()),
                Token::Ident("99999999999999999999".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_strings() {
        assert_eq!(
            tokenize("\"Bob Dylan\" \"\""),
            vec![
                Token::String("Bob Dylan".into()),
                Token::String(String::new()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_equal_and_semicolon() {
        assert_eq!(
            tokenize("age=30;"),
            vec![
                Token::Ident("age".into()),
                Token::Equal,
                Token::Number(30),
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let result = Tokenizer::new("\"hello").tokenize();
        assert!(matches!(result, Err(DbError::Syntax(_))));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize("   "), vec![Token::Eof]);
    }
}
