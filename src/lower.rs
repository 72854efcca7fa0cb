//! `DdStatements` → MySQL DDL.
//!
//! Each table becomes one `CREATE TABLE` block: its columns, the primary key, a foreign
//! key derived from `INTERLEAVE IN PARENT`, then the inline form of every index declared
//! on it. Any failure aborts the whole document; there is no partial output.
pub mod index;
pub mod keys;
pub mod relation;
pub mod types;

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::{ConvertError, Warning};
use crate::ir::{Column, CreateIndexStatement, CreateTableStatement, DdStatements};

use types::{map_column, MysqlType};

pub const HEADER: &str = "-- Auto-generated by jackup. DO NOT EDIT!\n--\n\n";

/// MySQL needs a fixed prefix length to index or key a TEXT/BLOB column.
pub const PSEUDO_KEY_LENGTH: u32 = 255;

/// Index names longer than this are not emitted.
pub const MAX_IDENTIFIER_LEN: usize = 255;

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Treat any warning as an error.
    pub strict: bool,
    /// Convert tables on the rayon pool. Output order is unchanged.
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub mysql: String,
    pub warnings: Vec<Warning>,
}

// ————————————————————————————————————————————————————————————————————————————
// SCHEMA LOOKUP
// ————————————————————————————————————————————————————————————————————————————

/// Name → table and table name → indexes, built once per document.
pub struct Schema<'a> {
    tables: IndexMap<&'a str, &'a CreateTableStatement>,
    indexes: IndexMap<&'a str, Vec<&'a CreateIndexStatement>>,
}

impl<'a> Schema<'a> {
    pub fn new(ddl: &'a DdStatements) -> Result<Self, ConvertError> {
        let tables: IndexMap<&str, &CreateTableStatement> =
            ddl.tables.iter().map(|t| (t.name.as_str(), t)).collect();

        let mut indexes: IndexMap<&str, Vec<&CreateIndexStatement>> = IndexMap::new();
        for index in &ddl.indexes {
            if !tables.contains_key(index.table.as_str()) {
                return Err(ConvertError::InvalidIndex {
                    index: index.name.clone(),
                    table: index.table.clone(),
                });
            }
            indexes.entry(index.table.as_str()).or_default().push(index);
        }

        Ok(Self { tables, indexes })
    }

    pub fn table(&self, name: &str) -> Option<&'a CreateTableStatement> {
        self.tables.get(name).copied()
    }

    /// Indexes on `table`, in declaration order.
    pub fn indexes_on(&self, table: &str) -> &[&'a CreateIndexStatement] {
        self.indexes.get(table).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EMITTER
// ————————————————————————————————————————————————————————————————————————————

struct TableBlock {
    text: String,
    warnings: Vec<Warning>,
}

pub fn lower_to_mysql(ddl: &DdStatements, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let schema = Schema::new(ddl)?;

    let blocks: Vec<TableBlock> = if options.parallel {
        // collect() on an indexed parallel iterator keeps input order
        ddl.tables
            .par_iter()
            .map(|table| lower_table(table, &schema))
            .collect::<Result<_, _>>()?
    } else {
        ddl.tables
            .iter()
            .map(|table| lower_table(table, &schema))
            .collect::<Result<_, _>>()?
    };

    let mut mysql = String::from(HEADER);
    let mut warnings = Vec::new();
    for block in blocks {
        mysql.push_str(&block.text);
        warnings.extend(block.warnings);
    }

    if options.strict && !warnings.is_empty() {
        return Err(ConvertError::Strict(warnings));
    }
    Ok(Conversion { mysql, warnings })
}

fn lower_table(table: &CreateTableStatement, schema: &Schema<'_>) -> Result<TableBlock, ConvertError> {
    let mut warnings = Vec::new();
    let mut defs = table
        .columns
        .iter()
        .map(|column| column_definition(table, column))
        .collect::<Result<Vec<_>, _>>()?;

    defs.push(keys::primary_key(table)?);
    if let Some(foreign_key) = relation::foreign_key(table, schema)? {
        defs.push(foreign_key);
    }
    for index in schema.indexes_on(&table.name) {
        defs.push(index::index_clause(table, index, &mut warnings)?);
    }

    let text = format!("CREATE TABLE {} (\n  {}\n);\n", quote(&table.name), defs.join(",\n  "));
    Ok(TableBlock { text, warnings })
}

/// `` `name` TYPE NULL|NOT NULL [DEFAULT CURRENT_TIMESTAMP] ``
fn column_definition(table: &CreateTableStatement, column: &Column) -> Result<String, ConvertError> {
    let ty = map_column(table, column)?;
    let nullability = if column.not_null { "NOT NULL" } else { "NULL" };
    let mut def = format!("{} {ty} {nullability}", quote(&column.name));
    // MySQL gives NOT NULL TIMESTAMP columns no implicit default
    if ty == MysqlType::Timestamp && column.not_null {
        def.push_str(" DEFAULT CURRENT_TIMESTAMP");
    }
    Ok(def)
}

pub(crate) fn quote(name: &str) -> String {
    format!("`{name}`")
}

// ------------------------------- Tests ------------------------------------ //
