//! Error and warning types for every stage of the pipeline.
use std::fmt;

use thiserror::Error;

use crate::ir::ColumnType;

/// Anything that can stop a document from converting.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Ir(#[from] IrError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

// ————————————————————————————————————————————————————————————————————————————
// FRONTEND
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lex error at line {line}, column {column}: {kind}")]
pub struct LexError {
    pub offset: usize, // byte offset into the source
    pub line: usize,
    pub column: usize,
    pub kind: LexErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unrecognized character {0:?}")]
    UnexpectedChar(char),
    #[error("unterminated quoted identifier")]
    UnterminatedQuotedIdentifier,
    #[error("quoted identifier `{0}` is not a valid name")]
    InvalidQuotedIdentifier(String),
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("malformed numeric literal `{0}`")]
    InvalidNumber(String),
}

/// Which statement the parser was in when it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Unknown,
    CreateDatabase,
    CreateTable,
    CreateIndex,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Unknown => write!(f, "statement"),
            StatementKind::CreateDatabase => write!(f, "CREATE DATABASE"),
            StatementKind::CreateTable => write!(f, "CREATE TABLE"),
            StatementKind::CreateIndex => write!(f, "CREATE INDEX"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error in {statement} at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub statement: StatementKind,
    pub offset: usize, // byte offset of the offending token
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// IR that did not come straight from the parser (JSON input) and fails its checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("at JSON path {path} → {message}")]
    Deserialize { path: String, message: String },
    #[error("`{name}` is not a valid identifier")]
    InvalidIdentifier { name: String },
    #[error("table `{table}` is defined more than once")]
    DuplicateTable { table: String },
    #[error("table `{table}` declares column `{column}` more than once")]
    DuplicateColumn { table: String, column: String },
    #[error("index `{index}` is defined more than once")]
    DuplicateIndex { index: String },
    #[error("`{owner}` lists key column `{column}` more than once")]
    DuplicateKeyColumn { owner: String, column: String },
    #[error("table `{table}`: length of column `{column}` is out of range")]
    InvalidLength { table: String, column: String },
    #[error("table `{table}` has no primary key")]
    MissingPrimaryKey { table: String },
    #[error("table `{table}` is interleaved in itself")]
    SelfInterleave { table: String },
}

// ————————————————————————————————————————————————————————————————————————————
// CONVERTER
// ————————————————————————————————————————————————————————————————————————————

/// The column type has no MySQL counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type {ty} has no MySQL equivalent")]
pub struct UnsupportedType {
    pub ty: ColumnType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyProblem {
    #[error("column is not declared on the table")]
    Undeclared,
    #[error("primary key columns must be NOT NULL")]
    Nullable,
    #[error("MySQL cannot reference an unbounded TEXT/BLOB column from a foreign key")]
    UnboundedForeignKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InterleaveProblem {
    #[error("parent table is not declared")]
    MissingParent,
    #[error("no column shares both name and type with the parent")]
    NoSharedColumn,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("table `{table}`: column `{column}`: {source}")]
    UnsupportedType {
        table: String,
        column: String,
        source: UnsupportedType,
    },
    #[error("table `{table}`: invalid key `{column}`: {problem}")]
    InvalidKey {
        table: String,
        column: String,
        problem: KeyProblem,
    },
    #[error("table `{table}`: invalid interleave in `{parent}`: {problem}")]
    InvalidInterleave {
        table: String,
        parent: String,
        problem: InterleaveProblem,
    },
    #[error("index `{index}` is declared on unknown table `{table}`")]
    InvalidIndex { index: String, table: String },
    #[error("strict mode: {} lossy conversion(s), first: {}", .0.len(), .0[0])]
    Strict(Vec<Warning>),
}

// ————————————————————————————————————————————————————————————————————————————
// WARNINGS
// ————————————————————————————————————————————————————————————————————————————

/// Something dropped on the way to MySQL. The conversion still succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    StoringDropped { index: String, columns: Vec<String> },
    NullFilteredIgnored { index: String },
    IndexInterleaveIgnored { index: String, parent: String },
    IndexNameOmitted { index: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::StoringDropped { index, columns } => write!(
                f,
                "index `{index}`: STORING ({}) has no MySQL equivalent and was dropped",
                columns.join(", ")
            ),
            Warning::NullFilteredIgnored { index } => {
                write!(f, "index `{index}`: NULL_FILTERED was ignored")
            }
            Warning::IndexInterleaveIgnored { index, parent } => {
                write!(f, "index `{index}`: INTERLEAVE IN `{parent}` was ignored")
            }
            Warning::IndexNameOmitted { index } => write!(
                f,
                "index `{index}`: name exceeds the MySQL identifier limit, left for MySQL to choose"
            ),
        }
    }
}
