// Strongly-typed IR for Spanner DDL. Built once by the parser, read-only afterwards.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::IrError;

/// Largest length Spanner accepts for `STRING(n)`.
pub const STRING_MAX_LENGTH: u32 = 2_621_440;
/// Largest length Spanner accepts for `BYTES(n)`.
pub const BYTES_MAX_LENGTH: u32 = 10_485_760;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Table, column and index names: `[A-Za-z][A-Za-z0-9_]*`, case-sensitive.
pub fn is_valid_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Length {
    Max,        // unbounded
    Fixed(u32), // >= 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Bool,
    Int64,
    Float64,
    String(Length),
    Bytes(Length),
    Date,
    Timestamp,
}

/// `Array` only ever wraps a scalar, so nested arrays are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Scalar(ScalarType),
    Array(ScalarType),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub not_null: bool,
    #[serde(default)]
    pub allow_commit_timestamp: bool, // OPTIONS (allow_commit_timestamp = true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyOrder {
    Ascending,
    Descending,
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPart {
    pub column: String,
    #[serde(default)]
    pub order: KeyOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OnDelete {
    Cascade,
    NoAction,
    #[default]
    Unspecified,
}

/// `INTERLEAVE IN PARENT <parent> [ON DELETE ...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub parent: String,
    #[serde(default)]
    pub on_delete: OnDelete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableStatement {
    pub name: String,
    pub columns: Vec<Column>,       // declaration order, unique names
    pub primary_key: Vec<KeyPart>,  // all PRIMARY KEY clauses, concatenated
    #[serde(default)]
    pub cluster: Option<Cluster>,   // None: not interleaved
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexStatement {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub null_filtered: bool,
    pub keys: Vec<KeyPart>,
    #[serde(default)]
    pub storing: Vec<String>,
    #[serde(default)]
    pub interleave: Option<String>, // `, INTERLEAVE IN <table>`
}

/// The whole schema. Interleave resolution and index attachment look across tables,
/// so conversion always works on this unit rather than on single statements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DdStatements {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub tables: Vec<CreateTableStatement>,
    #[serde(default)]
    pub indexes: Vec<CreateIndexStatement>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Length {
    fn is_within(self, limit: u32) -> bool {
        match self {
            Length::Max => true,
            Length::Fixed(n) => n >= 1 && n <= limit,
        }
    }
}

impl CreateTableStatement {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl DdStatements {
    /// Re-checks the invariants the parser guarantees. Needed for IR that did not come
    /// from the parser (e.g. JSON read back with `--from-ir`).
    pub fn validate(&self) -> Result<(), IrError> {
        if let Some(database) = &self.database {
            check_identifier(database)?;
        }

        let mut table_names = HashSet::new();
        for table in &self.tables {
            check_identifier(&table.name)?;
            if !table_names.insert(table.name.as_str()) {
                return Err(IrError::DuplicateTable { table: table.name.clone() });
            }

            let mut column_names = HashSet::new();
            for column in &table.columns {
                check_identifier(&column.name)?;
                if !column_names.insert(column.name.as_str()) {
                    return Err(IrError::DuplicateColumn {
                        table: table.name.clone(),
                        column: column.name.clone(),
                    });
                }
                let scalar = match column.ty {
                    ColumnType::Scalar(s) | ColumnType::Array(s) => s,
                };
                let in_range = match scalar {
                    ScalarType::String(len) => len.is_within(STRING_MAX_LENGTH),
                    ScalarType::Bytes(len) => len.is_within(BYTES_MAX_LENGTH),
                    _ => true,
                };
                if !in_range {
                    return Err(IrError::InvalidLength {
                        table: table.name.clone(),
                        column: column.name.clone(),
                    });
                }
            }

            if table.primary_key.is_empty() {
                return Err(IrError::MissingPrimaryKey { table: table.name.clone() });
            }
            check_key_parts(&table.name, &table.primary_key)?;

            if let Some(cluster) = &table.cluster {
                check_identifier(&cluster.parent)?;
                if cluster.parent == table.name {
                    return Err(IrError::SelfInterleave { table: table.name.clone() });
                }
            }
        }

        let mut index_names = HashSet::new();
        for index in &self.indexes {
            check_identifier(&index.name)?;
            check_identifier(&index.table)?;
            if !index_names.insert(index.name.as_str()) {
                return Err(IrError::DuplicateIndex { index: index.name.clone() });
            }
            check_key_parts(&index.name, &index.keys)?;
            for stored in &index.storing {
                check_identifier(stored)?;
            }
            if let Some(parent) = &index.interleave {
                check_identifier(parent)?;
            }
        }

        Ok(())
    }
}

fn check_identifier(name: &str) -> Result<(), IrError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(IrError::InvalidIdentifier { name: name.to_string() })
    }
}

fn check_key_parts(owner: &str, parts: &[KeyPart]) -> Result<(), IrError> {
    let mut seen = HashSet::new();
    for part in parts {
        check_identifier(&part.column)?;
        if !seen.insert(part.column.as_str()) {
            return Err(IrError::DuplicateKeyColumn {
                owner: owner.to_string(),
                column: part.column.clone(),
            });
        }
    }
    Ok(())
}

// Spanner spelling, used in diagnostics.

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Max => write!(f, "MAX"),
            Length::Fixed(n) => write!(f, "{n}"),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Bool => write!(f, "BOOL"),
            ScalarType::Int64 => write!(f, "INT64"),
            ScalarType::Float64 => write!(f, "FLOAT64"),
            ScalarType::String(len) => write!(f, "STRING({len})"),
            ScalarType::Bytes(len) => write!(f, "BYTES({len})"),
            ScalarType::Date => write!(f, "DATE"),
            ScalarType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Scalar(s) => write!(f, "{s}"),
            ColumnType::Array(s) => write!(f, "ARRAY<{s}>"),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
