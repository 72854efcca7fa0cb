use std::fmt;

use crate::error::{ConvertError, UnsupportedType};
use crate::ir::{Column, ColumnType, CreateTableStatement, Length, ScalarType};

/// Longest `STRING(n)` still emitted as `VARCHAR(n)`; anything longer becomes `TEXT`.
pub const VARCHAR_MAX_LENGTH: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MysqlType {
    TinyInt1,
    BigInt,
    Double,
    Varchar(u32),
    Text,
    Blob,
    Date,
    Timestamp,
}

impl MysqlType {
    /// TEXT and BLOB cannot be indexed without a prefix length, nor referenced by a
    /// foreign key.
    pub fn is_unbounded(self) -> bool {
        matches!(self, MysqlType::Text | MysqlType::Blob)
    }
}

impl fmt::Display for MysqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MysqlType::TinyInt1 => write!(f, "TINYINT(1)"),
            MysqlType::BigInt => write!(f, "BIGINT"),
            MysqlType::Double => write!(f, "DOUBLE"),
            MysqlType::Varchar(n) => write!(f, "VARCHAR({n})"),
            MysqlType::Text => write!(f, "TEXT"),
            MysqlType::Blob => write!(f, "BLOB"),
            MysqlType::Date => write!(f, "DATE"),
            MysqlType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// Spanner column type → MySQL column type. Arrays have no MySQL counterpart.
pub fn map_type(ty: &ColumnType) -> Result<MysqlType, UnsupportedType> {
    let scalar = match ty {
        ColumnType::Scalar(s) => s,
        ColumnType::Array(_) => return Err(UnsupportedType { ty: *ty }),
    };
    Ok(match scalar {
        ScalarType::Bool => MysqlType::TinyInt1,
        ScalarType::Int64 => MysqlType::BigInt,
        ScalarType::Float64 => MysqlType::Double,
        ScalarType::Date => MysqlType::Date,
        ScalarType::Timestamp => MysqlType::Timestamp,
        ScalarType::String(Length::Fixed(n)) if *n <= VARCHAR_MAX_LENGTH => MysqlType::Varchar(*n),
        ScalarType::String(_) => MysqlType::Text,
        ScalarType::Bytes(_) => MysqlType::Blob,
    })
}

/// [`map_type`] with the table/column context attached to the error.
pub fn map_column(table: &CreateTableStatement, column: &Column) -> Result<MysqlType, ConvertError> {
    map_type(&column.ty).map_err(|source| ConvertError::UnsupportedType {
        table: table.name.clone(),
        column: column.name.clone(),
        source,
    })
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped(s: ScalarType) -> String {
        map_type(&ColumnType::Scalar(s)).unwrap().to_string()
    }

    #[test]
    fn scalar_mapping_table() {
        assert_eq!(mapped(ScalarType::Bool), "TINYINT(1)");
        assert_eq!(mapped(ScalarType::Int64), "BIGINT");
        assert_eq!(mapped(ScalarType::Float64), "DOUBLE");
        assert_eq!(mapped(ScalarType::Date), "DATE");
        assert_eq!(mapped(ScalarType::Timestamp), "TIMESTAMP");
    }

    #[test]
    fn string_lengths() {
        assert_eq!(mapped(ScalarType::String(Length::Max)), "TEXT");
        assert_eq!(mapped(ScalarType::String(Length::Fixed(100))), "VARCHAR(100)");
        assert_eq!(mapped(ScalarType::String(Length::Fixed(256))), "VARCHAR(256)");
        assert_eq!(mapped(ScalarType::String(Length::Fixed(257))), "TEXT");
        assert_eq!(mapped(ScalarType::String(Length::Fixed(300))), "TEXT");
    }

    #[test]
    fn bytes_are_always_blob() {
        assert_eq!(mapped(ScalarType::Bytes(Length::Fixed(10))), "BLOB");
        assert_eq!(mapped(ScalarType::Bytes(Length::Max)), "BLOB");
    }

    #[test]
    fn arrays_are_unsupported() {
        let ty = ColumnType::Array(ScalarType::Int64);
        assert_eq!(map_type(&ty), Err(UnsupportedType { ty }));
    }

    #[test]
    fn unbounded_targets() {
        assert!(MysqlType::Text.is_unbounded());
        assert!(MysqlType::Blob.is_unbounded());
        assert!(!MysqlType::Varchar(10).is_unbounded());
        assert!(!MysqlType::Timestamp.is_unbounded());
    }
}
