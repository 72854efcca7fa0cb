//! Spanner DDL → `DdStatements`.
//!
//! Hand-written recursive descent over the token vector produced by [`lexer`]. A
//! document is a `;`-separated list of `CREATE DATABASE`, `CREATE TABLE` and
//! `CREATE [UNIQUE] [NULL_FILTERED] INDEX` statements. The first grammar mismatch
//! aborts the whole parse; there is no recovery.
pub mod lexer;
pub mod token;

use std::collections::HashSet;

use crate::error::{Error, ParseError, StatementKind};
use crate::ir::{
    Cluster, Column, ColumnType, CreateIndexStatement, CreateTableStatement, DdStatements,
    KeyOrder, KeyPart, Length, OnDelete, ScalarType, BYTES_MAX_LENGTH, STRING_MAX_LENGTH,
};

pub use lexer::{tokenize, Lexer};
use token::{line_col, Keyword, Punct, Span, Token, TokenKind};

/// Lex and parse a whole document.
pub fn parse_ddl(src: &str) -> Result<DdStatements, Error> {
    let tokens = tokenize(src)?;
    Ok(Parser::new(src, tokens).parse_document()?)
}

// ————————————————————————————————————————————————————————————————————————————
// PARSER STATE
// ————————————————————————————————————————————————————————————————————————————

pub struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>, // always ends with Eof
    position: usize,
    statement: StatementKind,
    table_names: HashSet<String>,
    index_names: HashSet<String>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = src.len();
            tokens.push(Token { kind: TokenKind::Eof, span: Span { start: end, end } });
        }
        Self {
            src,
            tokens,
            position: 0,
            statement: StatementKind::Unknown,
            table_names: HashSet::new(),
            index_names: HashSet::new(),
        }
    }

    pub fn parse_document(mut self) -> Result<DdStatements, ParseError> {
        let mut ddl = DdStatements::default();
        loop {
            while self.eat_punct(Punct::Semicolon) {}
            if self.at_eof() {
                break;
            }
            self.parse_statement(&mut ddl)?;
            if !self.at_eof() {
                self.expect_punct(Punct::Semicolon)?;
            }
        }
        Ok(ddl)
    }

    fn parse_statement(&mut self, ddl: &mut DdStatements) -> Result<(), ParseError> {
        self.statement = StatementKind::Unknown;
        self.expect_keyword(Keyword::Create)?;

        match &self.peek().kind {
            TokenKind::Keyword(Keyword::Database) => {
                self.statement = StatementKind::CreateDatabase;
                self.advance();
                let at = self.peek().span;
                let name = self.parse_identifier()?;
                if ddl.database.is_some() {
                    return Err(self.error_at(at, "only one CREATE DATABASE is allowed per document"));
                }
                ddl.database = Some(name);
            }
            TokenKind::Keyword(Keyword::Table) => {
                self.statement = StatementKind::CreateTable;
                self.advance();
                let table = self.parse_create_table()?;
                ddl.tables.push(table);
            }
            TokenKind::Keyword(Keyword::Unique | Keyword::NullFiltered | Keyword::Index) => {
                self.statement = StatementKind::CreateIndex;
                let index = self.parse_create_index()?;
                ddl.indexes.push(index);
            }
            _ => return Err(self.unexpected("DATABASE, TABLE or INDEX")),
        }
        Ok(())
    }

    // ————————————————————————————————————————————————————————————————————————
    // CREATE TABLE
    // ————————————————————————————————————————————————————————————————————————

    fn parse_create_table(&mut self) -> Result<CreateTableStatement, ParseError> {
        let at = self.peek().span;
        let name = self.parse_identifier()?;
        if !self.table_names.insert(name.clone()) {
            return Err(self.error_at(at, format!("table `{name}` is already defined")));
        }

        // column list, trailing comma allowed
        self.expect_punct(Punct::LParen)?;
        let mut columns: Vec<Column> = Vec::new();
        while !self.peek_punct(Punct::RParen) {
            let at = self.peek().span;
            let column = self.parse_column_def()?;
            if columns.iter().any(|c| c.name == column.name) {
                return Err(self.error_at(at, format!("column `{}` is already defined", column.name)));
            }
            columns.push(column);
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(Punct::RParen)?;

        // one or more PRIMARY KEY clauses, concatenated
        let mut primary_key: Vec<KeyPart> = Vec::new();
        loop {
            for (at, part) in self.parse_primary_key()? {
                if primary_key.iter().any(|p| p.column == part.column) {
                    return Err(self.error_at(
                        at,
                        format!("column `{}` appears more than once in the primary key", part.column),
                    ));
                }
                primary_key.push(part);
            }
            self.eat_comma_before(&[Keyword::Primary, Keyword::Interleave]);
            if !self.peek_keyword(Keyword::Primary) {
                break;
            }
        }

        let cluster = if self.eat_keyword(Keyword::Interleave) {
            self.expect_keyword(Keyword::In)?;
            self.expect_keyword(Keyword::Parent)?;
            let at = self.peek().span;
            let parent = self.parse_identifier()?;
            if parent == name {
                return Err(self.error_at(at, format!("table `{name}` cannot be interleaved in itself")));
            }
            let on_delete = self.parse_on_delete()?;
            Some(Cluster { parent, on_delete })
        } else {
            None
        };

        Ok(CreateTableStatement { name, columns, primary_key, cluster })
    }

    fn parse_column_def(&mut self) -> Result<Column, ParseError> {
        let name = self.parse_identifier()?;
        let ty = self.parse_column_type()?;
        let not_null = if self.eat_keyword(Keyword::Not) {
            self.expect_keyword(Keyword::Null)?;
            true
        } else {
            false
        };
        let allow_commit_timestamp = if self.eat_keyword(Keyword::Options) {
            self.parse_column_options()?
        } else {
            false
        };
        Ok(Column { name, ty, not_null, allow_commit_timestamp })
    }

    /// `( allow_commit_timestamp = {true|null} )`
    fn parse_column_options(&mut self) -> Result<bool, ParseError> {
        self.expect_punct(Punct::LParen)?;
        let known = matches!(&self.peek().kind, TokenKind::Identifier(o) if o == "allow_commit_timestamp");
        if !known {
            return Err(self.unexpected("`allow_commit_timestamp`"));
        }
        self.advance();
        self.expect_punct(Punct::Equals)?;
        let value = if self.eat_keyword(Keyword::True) {
            true
        } else if self.eat_keyword(Keyword::Null) {
            false
        } else {
            return Err(self.unexpected("TRUE or NULL"));
        };
        self.expect_punct(Punct::RParen)?;
        Ok(value)
    }

    fn parse_column_type(&mut self) -> Result<ColumnType, ParseError> {
        if self.eat_keyword(Keyword::Array) {
            self.expect_punct(Punct::LAngle)?;
            if self.peek_keyword(Keyword::Array) {
                return Err(self.error_here("nested ARRAY types are not supported"));
            }
            let item = self.parse_scalar_type()?;
            self.expect_punct(Punct::RAngle)?;
            return Ok(ColumnType::Array(item));
        }
        Ok(ColumnType::Scalar(self.parse_scalar_type()?))
    }

    fn parse_scalar_type(&mut self) -> Result<ScalarType, ParseError> {
        let ty = match &self.peek().kind {
            TokenKind::Keyword(Keyword::Bool) => ScalarType::Bool,
            TokenKind::Keyword(Keyword::Int64) => ScalarType::Int64,
            TokenKind::Keyword(Keyword::Float64) => ScalarType::Float64,
            TokenKind::Keyword(Keyword::Date) => ScalarType::Date,
            TokenKind::Keyword(Keyword::Timestamp) => ScalarType::Timestamp,
            TokenKind::Keyword(Keyword::String) => {
                self.advance();
                return Ok(ScalarType::String(self.parse_length(STRING_MAX_LENGTH)?));
            }
            TokenKind::Keyword(Keyword::Bytes) => {
                self.advance();
                return Ok(ScalarType::Bytes(self.parse_length(BYTES_MAX_LENGTH)?));
            }
            _ => return Err(self.unexpected("a column type")),
        };
        self.advance();
        Ok(ty)
    }

    /// `( <int> | MAX )`
    fn parse_length(&mut self, limit: u32) -> Result<Length, ParseError> {
        self.expect_punct(Punct::LParen)?;
        let length = match self.peek().kind {
            TokenKind::Keyword(Keyword::Max) => Length::Max,
            TokenKind::Decimal(n) | TokenKind::Hex(n) => {
                if n < 1 || n > i64::from(limit) {
                    return Err(self.error_here(format!("length must be between 1 and {limit}, got {n}")));
                }
                // bounded by `limit` above
                Length::Fixed(n as u32)
            }
            _ => return Err(self.unexpected("a length or MAX")),
        };
        self.advance();
        self.expect_punct(Punct::RParen)?;
        Ok(length)
    }

    /// `PRIMARY KEY ( key_part, ... )`, each part paired with where it started.
    fn parse_primary_key(&mut self) -> Result<Vec<(Span, KeyPart)>, ParseError> {
        self.expect_keyword(Keyword::Primary)?;
        self.expect_keyword(Keyword::Key)?;
        self.parse_key_parts()
    }

    fn parse_key_parts(&mut self) -> Result<Vec<(Span, KeyPart)>, ParseError> {
        self.expect_punct(Punct::LParen)?;
        let mut parts = Vec::new();
        loop {
            let at = self.peek().span;
            let column = self.parse_identifier()?;
            let order = if self.eat_keyword(Keyword::Asc) {
                KeyOrder::Ascending
            } else if self.eat_keyword(Keyword::Desc) {
                KeyOrder::Descending
            } else {
                KeyOrder::Unspecified
            };
            parts.push((at, KeyPart { column, order }));
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(Punct::RParen)?;
        Ok(parts)
    }

    /// `[ON DELETE {CASCADE | NO ACTION}]`
    fn parse_on_delete(&mut self) -> Result<OnDelete, ParseError> {
        if !self.eat_keyword(Keyword::On) {
            return Ok(OnDelete::Unspecified);
        }
        self.expect_keyword(Keyword::Delete)?;
        if self.eat_keyword(Keyword::Cascade) {
            return Ok(OnDelete::Cascade);
        }
        if self.eat_keyword(Keyword::No) {
            self.expect_keyword(Keyword::Action)?;
            return Ok(OnDelete::NoAction);
        }
        Err(self.unexpected("CASCADE or NO ACTION"))
    }

    // ————————————————————————————————————————————————————————————————————————
    // CREATE INDEX
    // ————————————————————————————————————————————————————————————————————————

    fn parse_create_index(&mut self) -> Result<CreateIndexStatement, ParseError> {
        let unique = self.eat_keyword(Keyword::Unique);
        let null_filtered = self.eat_keyword(Keyword::NullFiltered);
        self.expect_keyword(Keyword::Index)?;

        let at = self.peek().span;
        let name = self.parse_identifier()?;
        if !self.index_names.insert(name.clone()) {
            return Err(self.error_at(at, format!("index `{name}` is already defined")));
        }

        self.expect_keyword(Keyword::On)?;
        let table = self.parse_identifier()?;

        let mut keys: Vec<KeyPart> = Vec::new();
        for (at, part) in self.parse_key_parts()? {
            if keys.iter().any(|k| k.column == part.column) {
                return Err(self.error_at(at, format!("column `{}` appears more than once in the index", part.column)));
            }
            keys.push(part);
        }

        let mut storing: Vec<String> = Vec::new();
        if self.eat_keyword(Keyword::Storing) {
            self.expect_punct(Punct::LParen)?;
            loop {
                let at = self.peek().span;
                let column = self.parse_identifier()?;
                if storing.contains(&column) || keys.iter().any(|k| k.column == column) {
                    return Err(self.error_at(at, format!("column `{column}` is already part of the index")));
                }
                storing.push(column);
                if !self.eat_punct(Punct::Comma) {
                    break;
                }
            }
            self.expect_punct(Punct::RParen)?;
        }

        let interleave = if self.peek_punct(Punct::Comma) {
            self.advance();
            self.expect_keyword(Keyword::Interleave)?;
            self.expect_keyword(Keyword::In)?;
            Some(self.parse_identifier()?)
        } else {
            None
        };

        Ok(CreateIndexStatement { name, table, unique, null_filtered, keys, storing, interleave })
    }

    // ————————————————————————————————————————————————————————————————————————
    // TOKEN HELPERS
    // ————————————————————————————————————————————————————————————————————————

    fn peek(&self) -> &Token {
        // Eof is always last, so clamp to it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> &Token {
        &self.tokens[(self.position + 1).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek_keyword(&self, keyword: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(keyword)
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    fn peek_punct(&self, punct: Punct) -> bool {
        self.peek().kind == TokenKind::Punct(punct)
    }

    fn eat_punct(&mut self, punct: Punct) -> bool {
        if self.peek_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: Punct) -> Result<(), ParseError> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.unexpected(&punct.to_string()))
        }
    }

    /// Consumes a `,` only when one of `keywords` follows it.
    fn eat_comma_before(&mut self, keywords: &[Keyword]) {
        let follows = matches!(&self.peek_next().kind, TokenKind::Keyword(k) if keywords.contains(k));
        if self.peek_punct(Punct::Comma) && follows {
            self.advance();
        }
    }

    /// Bare or quoted identifier. Non-reserved keywords (`KEY`, `DATE`, ...) are names
    /// too, with their spelling taken from the source.
    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let token = self.peek();
        let name = match &token.kind {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Keyword(kw) if !kw.is_reserved() => {
                self.src[token.span.start..token.span.end].to_string()
            }
            TokenKind::Keyword(kw) => {
                return Err(self.error_here(format!(
                    "expected a name, found reserved keyword {kw} (quote it as `{kw}`)"
                )));
            }
            _ => return Err(self.unexpected("a name")),
        };
        self.advance();
        Ok(name)
    }

    // ————————————————————————————————————————————————————————————————————————
    // ERRORS
    // ————————————————————————————————————————————————————————————————————————

    fn error_at(&self, span: Span, message: impl Into<String>) -> ParseError {
        let (line, column) = line_col(self.src, span.start);
        ParseError {
            statement: self.statement,
            offset: span.start,
            line,
            column,
            message: message.into(),
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.peek().span, message)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        self.error_here(format!("expected {expected}, found {}", self.peek().kind))
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> DdStatements {
        match parse_ddl(src) {
            Ok(ddl) => ddl,
            Err(error) => panic!("failed to parse: {error}"),
        }
    }

    fn parse_err(src: &str) -> ParseError {
        match parse_ddl(src) {
            Err(Error::Parse(error)) => error,
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn create_table_with_all_column_shapes() {
        let ddl = parse(
            "CREATE TABLE Singers (
                SingerId   INT64 NOT NULL,
                FirstName  STRING(1024),
                Info       BYTES(MAX),
                Tags       ARRAY<STRING(32)>,
                Active     BOOL,
                Score      FLOAT64,
                Birthday   DATE,
                UpdatedAt  TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp = true),
            ) PRIMARY KEY (SingerId DESC)",
        );
        assert_eq!(ddl.tables.len(), 1);
        let table = &ddl.tables[0];
        assert_eq!(table.name, "Singers");
        assert_eq!(table.columns.len(), 8);
        assert_eq!(table.columns[0].ty, ColumnType::Scalar(ScalarType::Int64));
        assert!(table.columns[0].not_null);
        assert_eq!(table.columns[1].ty, ColumnType::Scalar(ScalarType::String(Length::Fixed(1024))));
        assert!(!table.columns[1].not_null);
        assert_eq!(table.columns[2].ty, ColumnType::Scalar(ScalarType::Bytes(Length::Max)));
        assert_eq!(table.columns[3].ty, ColumnType::Array(ScalarType::String(Length::Fixed(32))));
        assert!(table.columns[7].allow_commit_timestamp);
        assert_eq!(
            table.primary_key,
            vec![KeyPart { column: "SingerId".into(), order: KeyOrder::Descending }]
        );
        assert!(table.cluster.is_none());
    }

    #[test]
    fn multiple_statements_and_interleave() {
        let ddl = parse(
            "CREATE DATABASE music;
             CREATE TABLE Singers (SingerId INT64 NOT NULL) PRIMARY KEY (SingerId);
             CREATE TABLE Albums (
                SingerId INT64 NOT NULL,
                AlbumId  INT64 NOT NULL,
             ) PRIMARY KEY (SingerId, AlbumId),
               INTERLEAVE IN PARENT Singers ON DELETE CASCADE;",
        );
        assert_eq!(ddl.database.as_deref(), Some("music"));
        assert_eq!(ddl.tables.len(), 2);
        assert_eq!(
            ddl.tables[1].cluster,
            Some(Cluster { parent: "Singers".into(), on_delete: OnDelete::Cascade })
        );
    }

    #[test]
    fn on_delete_no_action() {
        let ddl = parse(
            "CREATE TABLE C (a INT64 NOT NULL) PRIMARY KEY (a) INTERLEAVE IN PARENT P ON DELETE NO ACTION",
        );
        assert_eq!(ddl.tables[0].cluster.as_ref().map(|c| c.on_delete), Some(OnDelete::NoAction));
    }

    #[test]
    fn repeated_primary_key_clauses_concatenate() {
        let ddl = parse("CREATE TABLE T (a INT64 NOT NULL, b INT64 NOT NULL) PRIMARY KEY (a) PRIMARY KEY (b)");
        let names: Vec<_> = ddl.tables[0].primary_key.iter().map(|p| p.column.as_str()).collect();
        assert_eq!(names, ["a", "b"]);

        let err = parse_err("CREATE TABLE T (a INT64 NOT NULL) PRIMARY KEY (a), PRIMARY KEY (a)");
        assert!(err.message.contains("more than once"));
        assert_eq!(err.statement, StatementKind::CreateTable);
    }

    #[test]
    fn create_index_variants() {
        let ddl = parse(
            "CREATE UNIQUE NULL_FILTERED INDEX AlbumsByTitle ON Albums (Title ASC, AlbumId) STORING (Year), INTERLEAVE IN Singers;
             CREATE INDEX ByYear ON Albums (Year DESC)",
        );
        assert_eq!(ddl.indexes.len(), 2);
        let first = &ddl.indexes[0];
        assert!(first.unique && first.null_filtered);
        assert_eq!(first.table, "Albums");
        assert_eq!(first.keys[0].order, KeyOrder::Ascending);
        assert_eq!(first.storing, vec!["Year".to_string()]);
        assert_eq!(first.interleave.as_deref(), Some("Singers"));
        let second = &ddl.indexes[1];
        assert!(!second.unique && !second.null_filtered);
        assert_eq!(second.keys[0].order, KeyOrder::Descending);
    }

    #[test]
    fn hex_lengths_and_non_reserved_keywords_as_names() {
        let ddl = parse("CREATE TABLE T (Key STRING(0x10) NOT NULL, date DATE) PRIMARY KEY (Key)");
        let table = &ddl.tables[0];
        assert_eq!(table.columns[0].name, "Key");
        assert_eq!(table.columns[0].ty, ColumnType::Scalar(ScalarType::String(Length::Fixed(16))));
        assert_eq!(table.columns[1].name, "date");
    }

    #[test]
    fn reserved_keyword_needs_quotes() {
        let err = parse_err("CREATE TABLE T (Desc INT64) PRIMARY KEY (Desc)");
        assert!(err.message.contains("reserved"));
        let ddl = parse("CREATE TABLE T (`Desc` INT64 NOT NULL) PRIMARY KEY (`Desc`)");
        assert_eq!(ddl.tables[0].columns[0].name, "Desc");
    }

    #[test]
    fn grammar_mismatches_report_position() {
        let err = parse_err("CREATE TABLE T (a INT64)");
        assert_eq!(err.statement, StatementKind::CreateTable);
        assert!(err.message.contains("PRIMARY"));
        assert_eq!(err.offset, 24);

        let err = parse_err("CREATE TABLE T (a INT32) PRIMARY KEY (a)");
        assert_eq!((err.line, err.column), (1, 19));

        let err = parse_err("ALTER TABLE T ADD COLUMN a INT64");
        assert_eq!(err.statement, StatementKind::Unknown);
    }

    #[test]
    fn invariant_violations_are_syntax_errors() {
        assert!(parse_err("CREATE TABLE T (a INT64) PRIMARY KEY (a); CREATE TABLE T (b INT64) PRIMARY KEY (b)")
            .message
            .contains("already defined"));
        assert!(parse_err("CREATE TABLE T (a INT64, a BOOL) PRIMARY KEY (a)")
            .message
            .contains("already defined"));
        assert!(parse_err("CREATE TABLE T (a STRING(0)) PRIMARY KEY (a)").message.contains("length"));
        assert!(parse_err("CREATE TABLE T (a ARRAY<ARRAY<INT64>>) PRIMARY KEY (a)")
            .message
            .contains("nested"));
        assert!(parse_err("CREATE TABLE T (a INT64) PRIMARY KEY (a) INTERLEAVE IN PARENT T")
            .message
            .contains("itself"));
        assert!(parse_err("CREATE INDEX I ON T (a) STORING (a)").message.contains("already part"));
        assert_eq!(
            parse_err("CREATE INDEX I ON T (a); CREATE INDEX I ON T (b)").statement,
            StatementKind::CreateIndex
        );
    }

    #[test]
    fn statements_need_separators() {
        let err = parse_err("CREATE DATABASE a CREATE DATABASE b");
        assert!(err.message.contains("`;`"));
    }

    #[test]
    fn lex_errors_surface_through_parse_ddl() {
        assert!(matches!(parse_ddl("CREATE TABLE T (a INT64 @)"), Err(Error::Lex(_))));
    }

    #[test]
    fn empty_document_is_empty_ir() {
        assert_eq!(parse(" -- nothing here\n;;"), DdStatements::default());
    }
}
