use serde::de::DeserializeOwned;

use crate::error::IrError;
use crate::ir::DdStatements;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, IrError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| IrError::Deserialize {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// A JSON IR document, checked against the invariants the parser would have enforced.
pub fn load_ir(src: &str) -> Result<DdStatements, IrError> {
    let ddl: DdStatements = from_str_with_path(src)?;
    ddl.validate()?;
    Ok(ddl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_ir_survives_json() {
        let ddl = crate::parse::parse_ddl(
            "CREATE TABLE T (a INT64 NOT NULL, b ARRAY<STRING(MAX)>) PRIMARY KEY (a DESC);
             CREATE UNIQUE INDEX TByB ON T (b) STORING (a)",
        )
        .unwrap();
        let json = serde_json::to_string_pretty(&ddl).unwrap();
        assert_eq!(load_ir(&json).unwrap(), ddl);
    }

    #[test]
    fn errors_carry_the_json_path() {
        let src = r#"{"tables": [{"name": "T", "columns": [{"name": "a", "ty": {"Scalar": "Int128"}, "not_null": true}], "primary_key": []}]}"#;
        match load_ir(src) {
            Err(IrError::Deserialize { path, .. }) => assert!(path.starts_with("tables[0].columns[0].ty"), "{path}"),
            other => panic!("expected a deserialize error, got {other:?}"),
        }
    }

    #[test]
    fn invariants_are_rechecked() {
        let src = r#"{"tables": [{"name": "T", "columns": [], "primary_key": []}]}"#;
        assert_eq!(load_ir(src), Err(IrError::MissingPrimaryKey { table: "T".into() }));
    }
}
