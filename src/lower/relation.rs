use crate::error::{ConvertError, InterleaveProblem, KeyProblem};
use crate::ir::{CreateTableStatement, OnDelete};

use super::keys::invalid_key;
use super::types::map_column;
use super::{quote, Schema};

/// Interleaving has no MySQL counterpart; the closest thing is a foreign key on a
/// column shared (same name, same type) by child and parent. `Ok(None)` when the table
/// is not interleaved.
pub fn foreign_key(child: &CreateTableStatement, schema: &Schema<'_>) -> Result<Option<String>, ConvertError> {
    let Some(cluster) = &child.cluster else {
        return Ok(None);
    };
    let interleave_error = |problem| ConvertError::InvalidInterleave {
        table: child.name.clone(),
        parent: cluster.parent.clone(),
        problem,
    };

    let parent = schema
        .table(&cluster.parent)
        .ok_or_else(|| interleave_error(InterleaveProblem::MissingParent))?;

    // first child column, in declaration order, that the parent also has
    let shared = child
        .columns
        .iter()
        .find(|c| parent.column(&c.name).is_some_and(|p| p.ty == c.ty))
        .ok_or_else(|| interleave_error(InterleaveProblem::NoSharedColumn))?;

    if map_column(child, shared)?.is_unbounded() {
        return Err(invalid_key(child, &shared.name, KeyProblem::UnboundedForeignKey));
    }

    let column = quote(&shared.name);
    let mut clause = format!("FOREIGN KEY ({column}) REFERENCES {} ({column})", quote(&parent.name));
    match cluster.on_delete {
        OnDelete::Cascade => clause.push_str(" ON DELETE CASCADE"),
        OnDelete::NoAction => clause.push_str(" ON DELETE NO ACTION"),
        OnDelete::Unspecified => {}
    }
    Ok(Some(clause))
}

// ------------------------------- Tests ------------------------------------ //
