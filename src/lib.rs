//! jackup: Cloud Spanner DDL → MySQL DDL.
//!
//! text → [`parse`] → [`ir::DdStatements`] → [`lower`] → MySQL text.
pub mod cli;
pub mod error;
pub mod ir;
pub mod lower;
pub mod parse;
pub mod path_de;

pub use error::{ConvertError, Error, Warning};
pub use lower::{Conversion, ConvertOptions};

/// Parse a Spanner DDL document and convert it to MySQL in one go.
pub fn convert(src: &str, options: &ConvertOptions) -> Result<Conversion, Error> {
    let ddl = parse::parse_ddl(src)?;
    Ok(lower::lower_to_mysql(&ddl, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InterleaveProblem, KeyProblem};

    const SCHEMA: &str = r#"
        CREATE TABLE Users (
            id         INT64 NOT NULL,
            email      STRING(MAX) NOT NULL,
            nickname   STRING(100),
            bio        STRING(300),
            avatar     BYTES(10),
            active     BOOL NOT NULL,
            rating     FLOAT64,
            birthday   DATE,
            created_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp = true),
            updated_at TIMESTAMP,
        ) PRIMARY KEY (id);

        CREATE TABLE Orders (
            id      INT64 NOT NULL,
            user_id INT64 NOT NULL,
        ) PRIMARY KEY (id, user_id),
          INTERLEAVE IN PARENT Users ON DELETE CASCADE;

        CREATE UNIQUE INDEX UsersByEmail ON Users (email);
        CREATE INDEX OrdersByUser ON Orders (user_id DESC);
    "#;

    #[test]
    fn full_document() {
        let out = convert(SCHEMA, &ConvertOptions::default()).unwrap();
        let expected = "\
-- Auto-generated by jackup. DO NOT EDIT!
--

CREATE TABLE `Users` (
  `id` BIGINT NOT NULL,
  `email` TEXT NOT NULL,
  `nickname` VARCHAR(100) NULL,
  `bio` TEXT NULL,
  `avatar` BLOB NULL,
  `active` TINYINT(1) NOT NULL,
  `rating` DOUBLE NULL,
  `birthday` DATE NULL,
  `created_at` TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
  `updated_at` TIMESTAMP NULL,
  PRIMARY KEY (`id`),
  UNIQUE (`email`(255))
);
CREATE TABLE `Orders` (
  `id` BIGINT NOT NULL,
  `user_id` BIGINT NOT NULL,
  PRIMARY KEY (`id`, `user_id`),
  FOREIGN KEY (`id`) REFERENCES `Users` (`id`) ON DELETE CASCADE,
  INDEX `OrdersByUser` (`user_id` DESC)
);
";
        assert_eq!(out.mysql, expected);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn unbounded_primary_key_gets_prefix() {
        let out = convert(
            "CREATE TABLE Docs (col STRING(MAX) NOT NULL) PRIMARY KEY (col)",
            &ConvertOptions::default(),
        )
        .unwrap();
        assert!(out.mysql.contains("PRIMARY KEY (`col`(255))"));
    }

    #[test]
    fn nullable_primary_key_produces_no_output() {
        let result = convert("CREATE TABLE T (colA INT64) PRIMARY KEY (colA)", &ConvertOptions::default());
        assert!(matches!(
            result,
            Err(Error::Convert(ConvertError::InvalidKey { problem: KeyProblem::Nullable, .. }))
        ));
    }

    #[test]
    fn missing_parent_produces_no_output() {
        let result = convert(
            "CREATE TABLE Orders (id INT64 NOT NULL) PRIMARY KEY (id), INTERLEAVE IN PARENT Users",
            &ConvertOptions::default(),
        );
        assert!(matches!(
            result,
            Err(Error::Convert(ConvertError::InvalidInterleave {
                problem: InterleaveProblem::MissingParent,
                ..
            }))
        ));
    }

    #[test]
    fn array_columns_are_rejected() {
        let result = convert(
            "CREATE TABLE T (id INT64 NOT NULL, tags ARRAY<STRING(10)>) PRIMARY KEY (id)",
            &ConvertOptions::default(),
        );
        assert!(matches!(result, Err(Error::Convert(ConvertError::UnsupportedType { .. }))));
    }

    #[test]
    fn database_statement_emits_nothing() {
        let out = convert("CREATE DATABASE shop", &ConvertOptions::default()).unwrap();
        assert_eq!(out.mysql, lower::HEADER);
    }
}
