use std::fmt;

/// Byte range of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    /// Bare or backtick-quoted name, quotes stripped.
    Identifier(String),
    Decimal(i64),
    Hex(i64),
    Punct(Punct),
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    Comma,
    Semicolon,
    LAngle,
    RAngle,
    Equals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Action,
    Array,
    Asc,
    Bool,
    Bytes,
    Cascade,
    Create,
    Database,
    Date,
    Delete,
    Desc,
    Float64,
    In,
    Index,
    Int64,
    Interleave,
    Key,
    Max,
    No,
    Not,
    Null,
    NullFiltered,
    On,
    Options,
    Parent,
    Primary,
    Storing,
    String,
    Table,
    Timestamp,
    True,
    Unique,
}

impl Keyword {
    /// Case-insensitive keyword lookup.
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word.to_ascii_uppercase().as_str() {
            "ACTION" => Keyword::Action,
            "ARRAY" => Keyword::Array,
            "ASC" => Keyword::Asc,
            "BOOL" => Keyword::Bool,
            "BYTES" => Keyword::Bytes,
            "CASCADE" => Keyword::Cascade,
            "CREATE" => Keyword::Create,
            "DATABASE" => Keyword::Database,
            "DATE" => Keyword::Date,
            "DELETE" => Keyword::Delete,
            "DESC" => Keyword::Desc,
            "FLOAT64" => Keyword::Float64,
            "IN" => Keyword::In,
            "INDEX" => Keyword::Index,
            "INT64" => Keyword::Int64,
            "INTERLEAVE" => Keyword::Interleave,
            "KEY" => Keyword::Key,
            "MAX" => Keyword::Max,
            "NO" => Keyword::No,
            "NOT" => Keyword::Not,
            "NULL" => Keyword::Null,
            "NULL_FILTERED" => Keyword::NullFiltered,
            "ON" => Keyword::On,
            "OPTIONS" => Keyword::Options,
            "PARENT" => Keyword::Parent,
            "PRIMARY" => Keyword::Primary,
            "STORING" => Keyword::Storing,
            "STRING" => Keyword::String,
            "TABLE" => Keyword::Table,
            "TIMESTAMP" => Keyword::Timestamp,
            "TRUE" => Keyword::True,
            "UNIQUE" => Keyword::Unique,
            _ => return None,
        };
        Some(kw)
    }

    /// Reserved words can only be used as names when backtick-quoted.
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            Keyword::Array
                | Keyword::Asc
                | Keyword::Create
                | Keyword::Desc
                | Keyword::In
                | Keyword::No
                | Keyword::Not
                | Keyword::Null
                | Keyword::On
                | Keyword::True
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Action => "ACTION",
            Keyword::Array => "ARRAY",
            Keyword::Asc => "ASC",
            Keyword::Bool => "BOOL",
            Keyword::Bytes => "BYTES",
            Keyword::Cascade => "CASCADE",
            Keyword::Create => "CREATE",
            Keyword::Database => "DATABASE",
            Keyword::Date => "DATE",
            Keyword::Delete => "DELETE",
            Keyword::Desc => "DESC",
            Keyword::Float64 => "FLOAT64",
            Keyword::In => "IN",
            Keyword::Index => "INDEX",
            Keyword::Int64 => "INT64",
            Keyword::Interleave => "INTERLEAVE",
            Keyword::Key => "KEY",
            Keyword::Max => "MAX",
            Keyword::No => "NO",
            Keyword::Not => "NOT",
            Keyword::Null => "NULL",
            Keyword::NullFiltered => "NULL_FILTERED",
            Keyword::On => "ON",
            Keyword::Options => "OPTIONS",
            Keyword::Parent => "PARENT",
            Keyword::Primary => "PRIMARY",
            Keyword::Storing => "STORING",
            Keyword::String => "STRING",
            Keyword::Table => "TABLE",
            Keyword::Timestamp => "TIMESTAMP",
            Keyword::True => "TRUE",
            Keyword::Unique => "UNIQUE",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Punct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::Comma => ",",
            Punct::Semicolon => ";",
            Punct::LAngle => "<",
            Punct::RAngle => ">",
            Punct::Equals => "=",
        };
        write!(f, "`{c}`")
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "keyword {kw}"),
            TokenKind::Identifier(name) => write!(f, "identifier `{name}`"),
            TokenKind::Decimal(n) => write!(f, "number {n}"),
            TokenKind::Hex(n) => write!(f, "number {n:#x}"),
            TokenKind::Punct(p) => write!(f, "{p}"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// 1-based line and column (in chars) of a byte offset.
pub fn line_col(src: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(src.len());
    let before = &src[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
