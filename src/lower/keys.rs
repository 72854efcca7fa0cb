use std::fmt::Write;

use crate::error::{ConvertError, KeyProblem};
use crate::ir::{Column, CreateTableStatement, KeyOrder, KeyPart};

use super::types::{map_column, MysqlType};
use super::{quote, PSEUDO_KEY_LENGTH};

/// `PRIMARY KEY (...)` in declared order. Every key column must exist and be NOT NULL.
pub fn primary_key(table: &CreateTableStatement) -> Result<String, ConvertError> {
    let parts = table
        .primary_key
        .iter()
        .map(|part| {
            let column = key_column(table, part)?;
            if !column.not_null {
                return Err(invalid_key(table, &part.column, KeyProblem::Nullable));
            }
            Ok(render_key_part(part, map_column(table, column)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!("PRIMARY KEY ({})", parts.join(", ")))
}

pub(crate) fn key_column<'t>(
    table: &'t CreateTableStatement,
    part: &KeyPart,
) -> Result<&'t Column, ConvertError> {
    table
        .column(&part.column)
        .ok_or_else(|| invalid_key(table, &part.column, KeyProblem::Undeclared))
}

/// `` `col` ``, plus a prefix length for TEXT/BLOB and ` DESC` when descending.
pub(crate) fn render_key_part(part: &KeyPart, ty: MysqlType) -> String {
    let mut out = quote(&part.column);
    if ty.is_unbounded() {
        let _ = write!(out, "({PSEUDO_KEY_LENGTH})");
    }
    if part.order == KeyOrder::Descending {
        out.push_str(" DESC");
    }
    out
}

pub(crate) fn invalid_key(table: &CreateTableStatement, column: &str, problem: KeyProblem) -> ConvertError {
    ConvertError::InvalidKey {
        table: table.name.clone(),
        column: column.to_string(),
        problem,
    }
}

// ------------------------------- Tests ------------------------------------ //
