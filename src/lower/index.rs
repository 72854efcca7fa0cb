use crate::error::{ConvertError, Warning};
use crate::ir::{CreateIndexStatement, CreateTableStatement};

use super::keys::{key_column, render_key_part};
use super::types::map_column;
use super::{quote, MAX_IDENTIFIER_LEN};

/// Inline MySQL clause for a Spanner index on `table`: `UNIQUE (...)` or
/// ``INDEX `name` (...)``. Spanner-only features are dropped and reported in `warnings`.
pub fn index_clause(
    table: &CreateTableStatement,
    index: &CreateIndexStatement,
    warnings: &mut Vec<Warning>,
) -> Result<String, ConvertError> {
    let keys = index
        .keys
        .iter()
        .map(|part| {
            let column = key_column(table, part)?;
            Ok(render_key_part(part, map_column(table, column)?))
        })
        .collect::<Result<Vec<_>, ConvertError>>()?
        .join(", ");

    if !index.storing.is_empty() {
        warnings.push(Warning::StoringDropped {
            index: index.name.clone(),
            columns: index.storing.clone(),
        });
    }
    if index.null_filtered {
        warnings.push(Warning::NullFilteredIgnored { index: index.name.clone() });
    }
    if let Some(parent) = &index.interleave {
        warnings.push(Warning::IndexInterleaveIgnored {
            index: index.name.clone(),
            parent: parent.clone(),
        });
    }

    if index.unique {
        return Ok(format!("UNIQUE ({keys})"));
    }
    // over the limit: unnamed, MySQL generates one
    if index.name.chars().count() > MAX_IDENTIFIER_LEN {
        warnings.push(Warning::IndexNameOmitted { index: index.name.clone() });
        return Ok(format!("INDEX ({keys})"));
    }
    Ok(format!("INDEX {} ({keys})", quote(&index.name)))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyProblem;
    use crate::ir::{Column, ColumnType, KeyOrder, KeyPart, Length, ScalarType};

    fn table() -> CreateTableStatement {
        let column = |name: &str, ty, not_null| Column {
            name: name.to_string(),
            ty: ColumnType::Scalar(ty),
            not_null,
            allow_commit_timestamp: false,
        };
        CreateTableStatement {
            name: "Albums".into(),
            columns: vec![
                column("AlbumId", ScalarType::Int64, true),
                column("Title", ScalarType::String(Length::Max), false),
                column("Year", ScalarType::Int64, false),
            ],
            primary_key: vec![KeyPart { column: "AlbumId".into(), order: KeyOrder::Unspecified }],
            cluster: None,
        }
    }

    fn index(name: &str, unique: bool, keys: &[(&str, KeyOrder)]) -> CreateIndexStatement {
        CreateIndexStatement {
            name: name.into(),
            table: "Albums".into(),
            unique,
            null_filtered: false,
            keys: keys.iter().map(|(c, order)| KeyPart { column: c.to_string(), order: *order }).collect(),
            storing: Vec::new(),
            interleave: None,
        }
    }

    #[test]
    fn plain_and_unique_indexes() {
        let mut warnings = Vec::new();
        let plain = index("ByYear", false, &[("Year", KeyOrder::Descending), ("AlbumId", KeyOrder::Unspecified)]);
        assert_eq!(
            index_clause(&table(), &plain, &mut warnings).unwrap(),
            "INDEX `ByYear` (`Year` DESC, `AlbumId`)"
        );
        let unique = index("ByTitle", true, &[("Title", KeyOrder::Ascending)]);
        assert_eq!(index_clause(&table(), &unique, &mut warnings).unwrap(), "UNIQUE (`Title`(255))");
        assert!(warnings.is_empty());
    }

    #[test]
    fn spanner_only_features_warn() {
        let mut warnings = Vec::new();
        let mut idx = index("ByYear", false, &[("Year", KeyOrder::Unspecified)]);
        idx.storing = vec!["Title".into()];
        idx.null_filtered = true;
        idx.interleave = Some("Singers".into());
        assert_eq!(index_clause(&table(), &idx, &mut warnings).unwrap(), "INDEX `ByYear` (`Year`)");
        assert_eq!(
            warnings,
            vec![
                Warning::StoringDropped { index: "ByYear".into(), columns: vec!["Title".into()] },
                Warning::NullFilteredIgnored { index: "ByYear".into() },
                Warning::IndexInterleaveIgnored { index: "ByYear".into(), parent: "Singers".into() },
            ]
        );
    }

    #[test]
    fn overlong_name_is_omitted() {
        let mut warnings = Vec::new();
        let name = format!("I{}", "x".repeat(MAX_IDENTIFIER_LEN));
        let idx = index(&name, false, &[("Year", KeyOrder::Unspecified)]);
        assert_eq!(index_clause(&table(), &idx, &mut warnings).unwrap(), "INDEX (`Year`)");
        assert_eq!(warnings, vec![Warning::IndexNameOmitted { index: name }]);
    }

    #[test]
    fn undeclared_key_column() {
        let mut warnings = Vec::new();
        let idx = index("Bad", false, &[("Nope", KeyOrder::Unspecified)]);
        assert!(matches!(
            index_clause(&table(), &idx, &mut warnings),
            Err(ConvertError::InvalidKey { problem: KeyProblem::Undeclared, .. })
        ));
    }
}
